/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Error)]
pub enum DestinationParseError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported scheme {0}")]
    UnsupportedScheme(String),
    #[error("no host found")]
    NoHostFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpScheme {
    Http,
    Https,
}

impl HttpScheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            HttpScheme::Http => "http",
            HttpScheme::Https => "https",
        }
    }

    /// The IANA registered WBEM ports
    pub const fn default_port(&self) -> u16 {
        match self {
            HttpScheme::Http => 5988,
            HttpScheme::Https => 5989,
        }
    }

    #[inline]
    pub fn is_tls(&self) -> bool {
        matches!(self, HttpScheme::Https)
    }
}

impl FromStr for HttpScheme {
    type Err = DestinationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(HttpScheme::Http),
            "https" => Ok(HttpScheme::Https),
            _ => Err(DestinationParseError::UnsupportedScheme(s.to_string())),
        }
    }
}

impl fmt::Display for HttpScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a connection goes to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Destination {
    scheme: HttpScheme,
    host: String,
    port: u16,
}

impl Destination {
    pub fn new(scheme: HttpScheme, host: &str, port: u16) -> Self {
        let port = if port == 0 {
            scheme.default_port()
        } else {
            port
        };
        Destination {
            scheme,
            host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
            port,
        }
    }

    pub fn from_url(url: &Url) -> Result<Self, DestinationParseError> {
        let scheme = HttpScheme::from_str(url.scheme())?;
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => return Err(DestinationParseError::NoHostFound),
        };
        Ok(Destination::new(
            scheme,
            &host,
            url.port().unwrap_or_else(|| scheme.default_port()),
        ))
    }

    #[inline]
    pub fn scheme(&self) -> HttpScheme {
        self.scheme
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The value to be used in the Host header
    pub fn host_header(&self) -> String {
        if let Ok(IpAddr::V6(ip)) = IpAddr::from_str(&self.host) {
            format!("[{ip}]:{}", self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Destination {
    type Err = DestinationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s)?;
        Destination::from_url(&url)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host_header())
    }
}
