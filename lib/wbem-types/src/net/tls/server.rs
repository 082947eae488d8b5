/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use rustls::ServerConfig;
use rustls::server::WebPkiClientVerifier;

use super::keystore::load_root_store;
use super::{KeyStoreConfig, TlsProtocol, TlsProvider};

const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RustlsServerConfig {
    pub driver: Arc<ServerConfig>,
    pub accept_timeout: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RustlsServerConfigBuilder {
    provider: TlsProvider,
    protocol: TlsProtocol,
    cipher_suites: Vec<String>,
    keystore: Option<KeyStoreConfig>,
    client_auth: bool,
    client_auth_truststore: Option<PathBuf>,
    accept_timeout: Duration,
}

impl Default for RustlsServerConfigBuilder {
    fn default() -> Self {
        RustlsServerConfigBuilder::empty()
    }
}

impl RustlsServerConfigBuilder {
    pub fn empty() -> Self {
        RustlsServerConfigBuilder {
            provider: TlsProvider::default(),
            protocol: TlsProtocol::default(),
            cipher_suites: Vec::new(),
            keystore: None,
            client_auth: false,
            client_auth_truststore: None,
            accept_timeout: DEFAULT_ACCEPT_TIMEOUT,
        }
    }

    pub fn check(&self) -> anyhow::Result<()> {
        let Some(keystore) = &self.keystore else {
            return Err(anyhow!("no keystore is set"));
        };
        keystore.check()
    }

    #[inline]
    pub fn set_provider(&mut self, provider: TlsProvider) {
        self.provider = provider;
    }

    #[inline]
    pub fn set_protocol(&mut self, protocol: TlsProtocol) {
        self.protocol = protocol;
    }

    #[inline]
    pub fn set_cipher_suites(&mut self, suites: Vec<String>) {
        self.cipher_suites = suites;
    }

    #[inline]
    pub fn set_keystore(&mut self, keystore: KeyStoreConfig) {
        self.keystore = Some(keystore);
    }

    #[inline]
    pub fn enable_client_auth(&mut self) {
        self.client_auth = true;
    }

    #[inline]
    pub fn set_client_auth_truststore(&mut self, path: PathBuf) {
        self.client_auth_truststore = Some(path);
    }

    #[inline]
    pub fn set_accept_timeout(&mut self, timeout: Duration) {
        self.accept_timeout = timeout;
    }

    pub fn build(&self) -> anyhow::Result<RustlsServerConfig> {
        self.check()?;

        let provider = self.provider.build(&self.cipher_suites)?;
        let builder = ServerConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(self.protocol.versions())
            .map_err(|e| anyhow!("invalid protocol versions for {}: {e}", self.protocol))?;

        let builder = if self.client_auth {
            let roots = load_root_store(self.client_auth_truststore.as_deref())?;
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .map_err(|e| anyhow!("failed to build client cert verifier: {e}"))?;
            builder.with_client_cert_verifier(verifier)
        } else {
            builder.with_no_client_auth()
        };

        let (certs, key) = match &self.keystore {
            Some(keystore) => keystore.load()?,
            None => return Err(anyhow!("no keystore is set")),
        };
        let config = builder
            .with_single_cert(certs, key)
            .map_err(|e| anyhow!("failed to set server cert pair: {e}"))?;

        Ok(RustlsServerConfig {
            driver: Arc::new(config),
            accept_timeout: self.accept_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keystore() {
        let builder = RustlsServerConfigBuilder::empty();
        assert!(builder.check().is_err());
        assert!(builder.build().is_err());
    }

    #[test]
    fn missing_keystore_file() {
        let mut builder = RustlsServerConfigBuilder::empty();
        builder.set_keystore(KeyStoreConfig::new(PathBuf::from("/nonexistent/server.pem")));
        assert!(builder.check().is_ok());
        assert!(builder.build().is_err());
    }
}
