/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use rustls::SupportedCipherSuite;
use rustls::crypto::CryptoProvider;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsProvider {
    #[default]
    Ring,
}

impl TlsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsProvider::Ring => "ring",
        }
    }

    fn default_provider(&self) -> CryptoProvider {
        match self {
            TlsProvider::Ring => rustls::crypto::ring::default_provider(),
        }
    }

    /// Build the crypto provider, restricted to `cipher_suites` if it is not empty.
    pub fn build(&self, cipher_suites: &[String]) -> anyhow::Result<Arc<CryptoProvider>> {
        let mut provider = self.default_provider();
        if !cipher_suites.is_empty() {
            let mut selected = Vec::with_capacity(cipher_suites.len());
            for name in cipher_suites {
                let Some(suite) = find_cipher_suite(&provider.cipher_suites, name) else {
                    return Err(anyhow!(
                        "cipher suite {name} is not supported by provider {}",
                        self.as_str()
                    ));
                };
                selected.push(suite);
            }
            provider.cipher_suites = selected;
        }
        Ok(Arc::new(provider))
    }
}

impl FromStr for TlsProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ring" | "default" => Ok(TlsProvider::Ring),
            _ => Err(anyhow!("unsupported TLS provider {s}")),
        }
    }
}

/// Match both the rustls names and the IANA names for TLS 1.3 suites,
/// e.g. TLS13_AES_128_GCM_SHA256 and TLS_AES_128_GCM_SHA256.
fn find_cipher_suite(all: &[SupportedCipherSuite], name: &str) -> Option<SupportedCipherSuite> {
    let name = name.trim().to_ascii_uppercase();
    all.iter()
        .find(|suite| {
            let rustls_name = format!("{:?}", suite.suite());
            if rustls_name == name {
                return true;
            }
            match rustls_name.strip_prefix("TLS13_") {
                Some(s) => name.strip_prefix("TLS_") == Some(s),
                None => false,
            }
        })
        .copied()
}
