/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use digest::Digest;
use md5::Md5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Md5Sess,
}

impl DigestAlgorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Md5Sess => "MD5-sess",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("md5") {
            Ok(DigestAlgorithm::Md5)
        } else if s.eq_ignore_ascii_case("md5-sess") {
            Ok(DigestAlgorithm::Md5Sess)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestQop {
    Auth,
    AuthInt,
}

impl DigestQop {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DigestQop::Auth => "auth",
            DigestQop::AuthInt => "auth-int",
        }
    }
}

impl FromStr for DigestQop {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auth") {
            Ok(DigestQop::Auth)
        } else if s.eq_ignore_ascii_case("auth-int") {
            Ok(DigestQop::AuthInt)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for DigestQop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn md5_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Md5::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

#[inline]
pub fn format_nc(nc: u32) -> String {
    format!("{nc:08x}")
}

/// Everything the digest response depends on
#[derive(Clone, Copy, Debug)]
pub struct DigestInput<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub realm: &'a str,
    pub nonce: &'a str,
    pub cnonce: &'a str,
    pub nc: u32,
    pub qop: Option<DigestQop>,
    pub algorithm: DigestAlgorithm,
    pub method: &'a str,
    pub uri: &'a str,
    pub body: &'a [u8],
}

impl DigestInput<'_> {
    pub fn ha1(&self) -> String {
        let ha1 = md5_hex(&[
            self.username.as_bytes(),
            self.realm.as_bytes(),
            self.password.as_bytes(),
        ]);
        match self.algorithm {
            DigestAlgorithm::Md5 => ha1,
            DigestAlgorithm::Md5Sess => md5_hex(&[
                ha1.as_bytes(),
                self.nonce.as_bytes(),
                self.cnonce.as_bytes(),
            ]),
        }
    }

    pub fn ha2(&self) -> String {
        match self.qop {
            Some(DigestQop::AuthInt) => {
                let body_hash = md5_hex(&[self.body]);
                md5_hex(&[
                    self.method.as_bytes(),
                    self.uri.as_bytes(),
                    body_hash.as_bytes(),
                ])
            }
            _ => md5_hex(&[self.method.as_bytes(), self.uri.as_bytes()]),
        }
    }

    /// The request digest
    pub fn response(&self) -> String {
        self.response_with(&self.ha1(), &self.ha2())
    }

    /// The server digest sent back in `rspauth`, computed with an empty method
    pub fn rspauth(&self) -> String {
        let ha2 = md5_hex(&[b"", self.uri.as_bytes()]);
        self.response_with(&self.ha1(), &ha2)
    }

    pub(crate) fn response_with(&self, ha1: &str, ha2: &str) -> String {
        match self.qop {
            Some(qop) => {
                let nc = format_nc(self.nc);
                md5_hex(&[
                    ha1.as_bytes(),
                    self.nonce.as_bytes(),
                    nc.as_bytes(),
                    self.cnonce.as_bytes(),
                    qop.as_str().as_bytes(),
                    ha2.as_bytes(),
                ])
            }
            None => md5_hex(&[ha1.as_bytes(), self.nonce.as_bytes(), ha2.as_bytes()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc2617_input() -> DigestInput<'static> {
        DigestInput {
            username: "Mufasa",
            password: "Circle Of Life",
            realm: "testrealm@host.com",
            nonce: "dcd98b7102dd2f0e8b11d0f600bfb0c093",
            cnonce: "0a4f113b",
            nc: 1,
            qop: Some(DigestQop::Auth),
            algorithm: DigestAlgorithm::Md5,
            method: "GET",
            uri: "/dir/index.html",
            body: b"",
        }
    }

    #[test]
    fn rfc2617_example() {
        let input = rfc2617_input();
        assert_eq!(input.response(), "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn pure_function() {
        let input = rfc2617_input();
        assert_eq!(input.response(), input.response());
        assert_eq!(input.rspauth(), input.rspauth());
        assert_ne!(input.response(), input.rspauth());
    }

    #[test]
    fn every_field_counts() {
        let base = rfc2617_input();
        let r = base.response();
        assert_ne!(DigestInput { nc: 2, ..base }.response(), r);
        assert_ne!(DigestInput { cnonce: "x", ..base }.response(), r);
        assert_ne!(DigestInput { uri: "/", ..base }.response(), r);
        assert_ne!(DigestInput { method: "POST", ..base }.response(), r);
        assert_ne!(
            DigestInput {
                algorithm: DigestAlgorithm::Md5Sess,
                ..base
            }
            .response(),
            r
        );
    }

    #[test]
    fn without_qop() {
        let input = DigestInput {
            qop: None,
            ..rfc2617_input()
        };
        let ha1 = md5_hex(&[b"Mufasa", b"testrealm@host.com", b"Circle Of Life"]);
        let ha2 = md5_hex(&[b"GET", b"/dir/index.html"]);
        let expected = md5_hex(&[
            ha1.as_bytes(),
            b"dcd98b7102dd2f0e8b11d0f600bfb0c093",
            ha2.as_bytes(),
        ]);
        assert_eq!(input.response(), expected);
        // nc and cnonce are not used
        assert_eq!(DigestInput { nc: 9, ..input }.response(), expected);
    }

    #[test]
    fn auth_int() {
        let input = DigestInput {
            qop: Some(DigestQop::AuthInt),
            method: "POST",
            body: b"<CIM/>",
            ..rfc2617_input()
        };
        let body_hash = md5_hex(&[b"<CIM/>"]);
        let ha2 = md5_hex(&[b"POST", b"/dir/index.html", body_hash.as_bytes()]);
        assert_eq!(input.ha2(), ha2);
        assert_ne!(
            DigestInput {
                body: b"<CIM />",
                ..input
            }
            .response(),
            input.response()
        );
    }

    #[test]
    fn md5_sess() {
        let input = DigestInput {
            algorithm: DigestAlgorithm::Md5Sess,
            ..rfc2617_input()
        };
        let ha1 = md5_hex(&[b"Mufasa", b"testrealm@host.com", b"Circle Of Life"]);
        let sess = md5_hex(&[
            ha1.as_bytes(),
            b"dcd98b7102dd2f0e8b11d0f600bfb0c093",
            b"0a4f113b",
        ]);
        assert_eq!(input.ha1(), sess);
    }

    #[test]
    fn nc_format() {
        assert_eq!(format_nc(1), "00000001");
        assert_eq!(format_nc(0x1ab), "000001ab");
    }

    #[test]
    fn parse_names() {
        assert_eq!(
            DigestAlgorithm::from_str("md5-SESS"),
            Ok(DigestAlgorithm::Md5Sess)
        );
        assert!(DigestAlgorithm::from_str("SHA-256").is_err());
        assert_eq!(DigestQop::from_str("AUTH-INT"), Ok(DigestQop::AuthInt));
        assert!(DigestQop::from_str("auth-conf").is_err());
    }
}
