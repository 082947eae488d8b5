/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use wbem_http::header;

use crate::basic::BasicAuth;
use crate::digest::{DigestAuth, DigestRequest};
use crate::local::LocalAuth;
use crate::{AuthError, Challenge};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    Basic,
    Digest,
    Local,
    Custom,
}

impl AuthScheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Basic => "Basic",
            AuthScheme::Digest => "Digest",
            AuthScheme::Local => "Local",
            AuthScheme::Custom => "Custom",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension point for schemes registered through an `AuthInfoFactory`
pub trait CustomAuth: fmt::Debug + Send {
    fn header_name(&self, proxy: bool) -> &'static str {
        if proxy {
            header::PROXY_AUTHORIZATION
        } else {
            header::AUTHORIZATION
        }
    }

    fn send_proactively(&self) -> bool {
        false
    }

    fn keep_alive_on_challenge(&self) -> bool {
        true
    }

    fn realm(&self) -> Option<&str> {
        None
    }

    fn update_from_challenge(&mut self, challenge: &Challenge) -> Result<(), AuthError>;

    fn header_value(&mut self, method: &str, uri: &str, body: &[u8]) -> Result<String, AuthError>;

    fn verify_response(&mut self, _authentication_info: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// A header value rendered for one request
#[derive(Clone, Debug)]
pub struct AuthHeader {
    pub value: String,
    /// Digest state the response to this request is checked against
    pub digest: Option<DigestRequest>,
}

impl AuthHeader {
    fn plain(value: String) -> Self {
        AuthHeader {
            value,
            digest: None,
        }
    }
}

/// Credentials and challenge state of one auth scheme
#[derive(Debug)]
pub enum AuthInfo {
    Basic(BasicAuth),
    Digest(DigestAuth),
    Local(LocalAuth),
    Custom(Box<dyn CustomAuth>),
}

impl AuthInfo {
    pub fn scheme(&self) -> AuthScheme {
        match self {
            AuthInfo::Basic(_) => AuthScheme::Basic,
            AuthInfo::Digest(_) => AuthScheme::Digest,
            AuthInfo::Local(_) => AuthScheme::Local,
            AuthInfo::Custom(_) => AuthScheme::Custom,
        }
    }

    pub fn header_name(&self, proxy: bool) -> &'static str {
        match self {
            AuthInfo::Local(_) => header::PEGASUS_AUTHORIZATION,
            AuthInfo::Custom(c) => c.header_name(proxy),
            _ => {
                if proxy {
                    header::PROXY_AUTHORIZATION
                } else {
                    header::AUTHORIZATION
                }
            }
        }
    }

    /// Whether the header is sent with the first request, before any challenge
    pub fn send_proactively(&self) -> bool {
        match self {
            AuthInfo::Local(_) => true,
            AuthInfo::Custom(c) => c.send_proactively(),
            _ => false,
        }
    }

    /// Whether the connection should be kept across the challenge round trip
    pub fn keep_alive_on_challenge(&self) -> bool {
        match self {
            AuthInfo::Custom(c) => c.keep_alive_on_challenge(),
            _ => true,
        }
    }

    pub fn realm(&self) -> Option<&str> {
        match self {
            AuthInfo::Basic(b) => b.realm(),
            AuthInfo::Digest(d) => Some(d.realm()),
            AuthInfo::Local(_) => None,
            AuthInfo::Custom(c) => c.realm(),
        }
    }

    pub fn update_from_challenge(&mut self, challenge: &Challenge) -> Result<(), AuthError> {
        match self {
            AuthInfo::Basic(b) => {
                if let Some(realm) = challenge.realm() {
                    b.set_realm(realm);
                }
                Ok(())
            }
            AuthInfo::Digest(d) => d.update_from_challenge(challenge),
            AuthInfo::Local(l) => {
                l.update_from_challenge(challenge);
                Ok(())
            }
            AuthInfo::Custom(c) => c.update_from_challenge(challenge),
        }
    }

    /// Render the header value for a request
    pub fn header_value(
        &mut self,
        method: &str,
        uri: &str,
        body: &[u8],
    ) -> Result<AuthHeader, AuthError> {
        match self {
            AuthInfo::Basic(b) => Ok(AuthHeader::plain(b.header_value())),
            AuthInfo::Digest(d) => {
                let r = d.authorize(method, uri, body);
                Ok(AuthHeader {
                    value: r.value,
                    digest: r.request,
                })
            }
            AuthInfo::Local(l) => Ok(AuthHeader::plain(l.header_value())),
            AuthInfo::Custom(c) => c.header_value(method, uri, body).map(AuthHeader::plain),
        }
    }

    /// Check the Authentication-Info header of a successful response.
    ///
    /// `digest` is the state of the request the response answers.
    pub fn verify_response(
        &mut self,
        authentication_info: Option<&str>,
        digest: Option<&DigestRequest>,
    ) -> Result<(), AuthError> {
        let Some(info) = authentication_info else {
            return Ok(());
        };
        match self {
            AuthInfo::Digest(d) => d.verify_authentication_info(info, digest),
            AuthInfo::Custom(c) => c.verify_response(info),
            _ => Ok(()),
        }
    }
}
