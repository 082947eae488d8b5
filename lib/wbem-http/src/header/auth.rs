/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub const AUTHORIZATION: &str = "Authorization";
pub const PROXY_AUTHORIZATION: &str = "Proxy-Authorization";
pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";
pub const PROXY_AUTHENTICATE: &str = "Proxy-Authenticate";
pub const AUTHENTICATION_INFO: &str = "Authentication-Info";

/// Vendor headers of the OpenPegasus local authentication scheme
pub const PEGASUS_AUTHORIZATION: &str = "PegasusAuthorization";
pub const PEGASUS_AUTHENTICATE: &str = "PegasusAuthenticate";

pub fn www_authenticate_basic(realm: &str) -> String {
    format!("{WWW_AUTHENTICATE}: Basic realm=\"{realm}\"\r\n")
}

pub fn www_authenticate_digest(realm: &str, nonce: &str, qop: Option<&str>) -> String {
    match qop {
        Some(qop) => format!(
            "{WWW_AUTHENTICATE}: Digest realm=\"{realm}\", qop=\"{qop}\", nonce=\"{nonce}\"\r\n"
        ),
        None => format!("{WWW_AUTHENTICATE}: Digest realm=\"{realm}\", nonce=\"{nonce}\"\r\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_www_authenticate_basic() {
        assert_eq!(
            www_authenticate_basic("cimom"),
            "WWW-Authenticate: Basic realm=\"cimom\"\r\n"
        );
    }

    #[test]
    fn t_www_authenticate_digest() {
        assert_eq!(
            www_authenticate_digest("test", "abc123", Some("auth")),
            "WWW-Authenticate: Digest realm=\"test\", qop=\"auth\", nonce=\"abc123\"\r\n"
        );
        assert_eq!(
            www_authenticate_digest("test", "abc123", None),
            "WWW-Authenticate: Digest realm=\"test\", nonce=\"abc123\"\r\n"
        );
    }
}
