/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use rustls::SupportedProtocolVersion;

static TLS12_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS12];
static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// The protocol name used to select enabled TLS versions.
///
/// `TLS` enables every version rustls supports, the others pin a single one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsProtocol {
    #[default]
    Tls,
    Tls12,
    Tls13,
}

impl TlsProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsProtocol::Tls => "TLS",
            TlsProtocol::Tls12 => "TLSv1.2",
            TlsProtocol::Tls13 => "TLSv1.3",
        }
    }

    pub fn versions(&self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsProtocol::Tls => rustls::ALL_VERSIONS,
            TlsProtocol::Tls12 => TLS12_ONLY,
            TlsProtocol::Tls13 => TLS13_ONLY,
        }
    }
}

impl FromStr for TlsProtocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "any" => Ok(TlsProtocol::Tls),
            "1.2" | "tls12" | "tls1.2" | "tls1_2" | "tlsv1.2" => Ok(TlsProtocol::Tls12),
            "1.3" | "tls13" | "tls1.3" | "tls1_3" | "tlsv1.3" => Ok(TlsProtocol::Tls13),
            _ => Err(anyhow!("unsupported TLS protocol {s}")),
        }
    }
}

impl fmt::Display for TlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_valid() {
        assert_eq!(TlsProtocol::from_str("TLS").unwrap(), TlsProtocol::Tls);
        assert_eq!(TlsProtocol::from_str("SSL").unwrap(), TlsProtocol::Tls);
        assert_eq!(TlsProtocol::from_str("TLSv1.2").unwrap(), TlsProtocol::Tls12);
        assert_eq!(TlsProtocol::from_str("tls1_3").unwrap(), TlsProtocol::Tls13);
        assert_eq!(TlsProtocol::from_str("1.3").unwrap(), TlsProtocol::Tls13);
    }

    #[test]
    fn from_str_invalid() {
        assert!(TlsProtocol::from_str("").is_err());
        assert!(TlsProtocol::from_str("TLSv1.0").is_err());
        assert!(TlsProtocol::from_str("SSLv3").is_err());
    }

    #[test]
    fn versions() {
        assert_eq!(TlsProtocol::Tls12.versions().len(), 1);
        assert_eq!(TlsProtocol::Tls13.versions().len(), 1);
        assert_eq!(TlsProtocol::Tls.versions().len(), rustls::ALL_VERSIONS.len());
    }
}
