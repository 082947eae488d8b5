/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, anyhow};
use rustls::RootCertStore;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyStoreType {
    #[default]
    Pem,
}

impl FromStr for KeyStoreType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pem" => Ok(KeyStoreType::Pem),
            _ => Err(anyhow!("unsupported keystore type {s}")),
        }
    }
}

/// A certificate chain together with its private key.
///
/// Only PEM stores are supported. They are never encrypted, so the
/// password is kept only for configuration compatibility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyStoreConfig {
    path: PathBuf,
    password: Option<String>,
    store_type: KeyStoreType,
}

impl KeyStoreConfig {
    pub fn new(path: PathBuf) -> Self {
        KeyStoreConfig {
            path,
            password: None,
            store_type: KeyStoreType::Pem,
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }

    #[inline]
    pub fn set_password(&mut self, password: String) {
        self.password = Some(password);
    }

    #[inline]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[inline]
    pub fn set_store_type(&mut self, store_type: KeyStoreType) {
        self.store_type = store_type;
    }

    #[inline]
    pub fn store_type(&self) -> KeyStoreType {
        self.store_type
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(anyhow!("no keystore path is set"));
        }
        Ok(())
    }

    pub fn load(&self) -> anyhow::Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
        self.check()?;
        match self.store_type {
            KeyStoreType::Pem => {
                let certs = load_certs(&self.path)?;
                if certs.is_empty() {
                    return Err(anyhow!(
                        "no certificate found in keystore {}",
                        self.path.display()
                    ));
                }
                let key = load_private_key(&self.path)?;
                Ok((certs, key))
            }
        }
    }
}

fn open_pem(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file =
        File::open(path).map_err(|e| anyhow!("failed to open file {}: {e}", path.display()))?;
    Ok(BufReader::new(file))
}

pub(super) fn load_certs(path: &Path) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let mut reader = open_pem(path)?;
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .context(format!("invalid certificate in file {}", path.display()))
}

fn load_private_key(path: &Path) -> anyhow::Result<PrivateKeyDer<'static>> {
    let mut reader = open_pem(path)?;
    rustls_pemfile::private_key(&mut reader)
        .context(format!("invalid private key in file {}", path.display()))?
        .ok_or_else(|| anyhow!("no private key found in file {}", path.display()))
}

pub(super) fn load_root_store(truststore: Option<&Path>) -> anyhow::Result<RootCertStore> {
    let mut store = RootCertStore::empty();
    match truststore {
        Some(path) => {
            let certs = load_certs(path)?;
            let (added, ignored) = store.add_parsable_certificates(certs);
            if added == 0 {
                return Err(anyhow!("no valid CA certificate in {}", path.display()));
            }
            if ignored > 0 {
                log::warn!(
                    "{ignored} certificates in truststore {} are ignored",
                    path.display()
                );
            }
        }
        None => store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned()),
    }
    Ok(store)
}
