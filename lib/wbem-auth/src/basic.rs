/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use base64::alphabet::Alphabet;
use base64::engine::{GeneralPurpose, general_purpose};
use base64::Engine;

use wbem_types::auth::{Password, Username};

const PRIVATE_ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/") {
        Ok(a) => a,
        Err(_) => panic!("invalid base64 alphabet"),
    };

/// The codec used for Basic credentials, independent of any platform codec
pub const BASIC_ENGINE: GeneralPurpose =
    GeneralPurpose::new(&PRIVATE_ALPHABET, general_purpose::PAD);

#[derive(Clone, Debug)]
pub struct BasicAuth {
    username: Username,
    password: Password,
    realm: Option<String>,
}

impl BasicAuth {
    pub fn new(username: Username, password: Password) -> Self {
        BasicAuth {
            username,
            password,
            realm: None,
        }
    }

    #[inline]
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    #[inline]
    pub fn set_realm(&mut self, realm: &str) {
        self.realm = Some(realm.to_string());
    }

    pub fn header_value(&self) -> String {
        format!(
            "Basic {}",
            BASIC_ENGINE.encode(format!(
                "{}:{}",
                self.username.as_original(),
                self.password.as_original()
            ))
        )
    }
}

/// Decode the value of a Basic Authorization header into username and password
pub fn decode_authorization(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASIC_ENGINE.decode(encoded.trim()).ok()?;
    let s = String::from_utf8(decoded).ok()?;
    let (user, pass) = s.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value() {
        let auth = BasicAuth::new(
            Username::from_original("user").unwrap(),
            Password::from_original("pass").unwrap(),
        );
        assert_eq!(auth.header_value(), "Basic dXNlcjpwYXNz");
        assert_eq!(
            decode_authorization(&auth.header_value()),
            Some(("user".to_string(), "pass".to_string()))
        );
    }

    #[test]
    fn empty_and_utf8() {
        let auth = BasicAuth::new(Username::empty(), Password::empty());
        assert_eq!(auth.header_value(), "Basic Og==");

        let auth = BasicAuth::new(
            Username::from_original("b\u{00e9}b\u{00e9}").unwrap(),
            Password::from_original("p@ss:w0rd").unwrap(),
        );
        assert_eq!(
            decode_authorization(&auth.header_value()),
            Some(("b\u{00e9}b\u{00e9}".to_string(), "p@ss:w0rd".to_string()))
        );
    }

    #[test]
    fn decode_invalid() {
        assert_eq!(decode_authorization("Digest abc"), None);
        assert_eq!(decode_authorization("Basic !!!"), None);
        assert_eq!(decode_authorization("Basic"), None);
    }
}
