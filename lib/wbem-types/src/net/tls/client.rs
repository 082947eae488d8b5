/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use rustls::ClientConfig;

use super::keystore::load_root_store;
use super::{KeyStoreConfig, TlsProtocol, TlsProvider};

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RustlsClientConfig {
    pub driver: Arc<ClientConfig>,
    pub handshake_timeout: Duration,
    /// Complete the handshake eagerly while holding a process wide lock
    pub sync_handshake: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RustlsClientConfigBuilder {
    provider: TlsProvider,
    protocol: TlsProtocol,
    cipher_suites: Vec<String>,
    truststore: Option<PathBuf>,
    keystore: Option<KeyStoreConfig>,
    handshake_timeout: Duration,
    sync_handshake: bool,
}

impl Default for RustlsClientConfigBuilder {
    fn default() -> Self {
        RustlsClientConfigBuilder::empty()
    }
}

impl RustlsClientConfigBuilder {
    pub fn empty() -> Self {
        RustlsClientConfigBuilder {
            provider: TlsProvider::default(),
            protocol: TlsProtocol::default(),
            cipher_suites: Vec::new(),
            truststore: None,
            keystore: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            sync_handshake: false,
        }
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if let Some(keystore) = &self.keystore {
            keystore.check()?;
        }
        if self.handshake_timeout.is_zero() {
            return Err(anyhow!("handshake timeout should not be zero"));
        }
        Ok(())
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
    pub fn protocol(&self) -> TlsProtocol {
        self.protocol
    }

    #[inline]
    pub fn set_cipher_suites(&mut self, suites: Vec<String>) {
        self.cipher_suites = suites;
    }

    #[inline]
    pub fn cipher_suites(&self) -> &[String] {
        &self.cipher_suites
    }

    /// PEM file with the CA certificates, the webpki roots are used if not set
    #[inline]
    pub fn set_truststore(&mut self, path: PathBuf) {
        self.truststore = Some(path);
    }

    /// Client certificate for mutual TLS
    #[inline]
    pub fn set_keystore(&mut self, keystore: KeyStoreConfig) {
        self.keystore = Some(keystore);
    }

    #[inline]
    pub fn set_handshake_timeout(&mut self, timeout: Duration) {
        self.handshake_timeout = timeout;
    }

    #[inline]
    pub fn set_sync_handshake(&mut self, enable: bool) {
        self.sync_handshake = enable;
    }

    #[inline]
    pub fn sync_handshake(&self) -> bool {
        self.sync_handshake
    }

    pub fn build(&self) -> anyhow::Result<RustlsClientConfig> {
        self.check()?;

        let provider = self.provider.build(&self.cipher_suites)?;
        let root_store = load_root_store(self.truststore.as_deref())?;

        let builder = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(self.protocol.versions())
            .map_err(|e| anyhow!("invalid protocol versions for {}: {e}", self.protocol))?
            .with_root_certificates(root_store);

        let config = match &self.keystore {
            Some(keystore) => {
                let (certs, key) = keystore.load()?;
                builder
                    .with_client_auth_cert(certs, key)
                    .map_err(|e| anyhow!("failed to set client cert pair: {e}"))?
            }
            None => builder.with_no_client_auth(),
        };

        Ok(RustlsClientConfig {
            driver: Arc::new(config),
            handshake_timeout: self.handshake_timeout,
            sync_handshake: self.sync_handshake,
        })
    }
}
