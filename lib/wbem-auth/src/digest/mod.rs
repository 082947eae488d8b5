/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Write;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use wbem_types::auth::{Password, Username};

use crate::{AuthError, Challenge};

mod calc;
pub use calc::{DigestAlgorithm, DigestInput, DigestQop, format_nc};

/// Client side state of the RFC 2617 digest scheme
#[derive(Clone, Debug)]
pub struct DigestAuth {
    username: Username,
    password: Password,
    realm: String,
    nonce: String,
    cnonce: String,
    nc: u32,
    opaque: Option<String>,
    qop: Option<DigestQop>,
    algorithm: DigestAlgorithm,
    algorithm_in_challenge: bool,
    session_key: Option<String>,
    response: Option<String>,
    uri: String,
}

impl DigestAuth {
    pub fn new(username: Username, password: Password) -> Self {
        DigestAuth {
            username,
            password,
            realm: String::new(),
            nonce: String::new(),
            cnonce: String::new(),
            nc: 0,
            opaque: None,
            qop: None,
            algorithm: DigestAlgorithm::Md5,
            algorithm_in_challenge: false,
            session_key: None,
            response: None,
            uri: String::new(),
        }
    }

    #[inline]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    #[inline]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    #[inline]
    pub fn cnonce(&self) -> &str {
        &self.cnonce
    }

    #[inline]
    pub fn nc(&self) -> u32 {
        self.nc
    }

    #[inline]
    pub fn qop(&self) -> Option<DigestQop> {
        self.qop
    }

    #[inline]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// The response digest sent with the last request
    #[inline]
    pub fn last_response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn update_from_challenge(&mut self, challenge: &Challenge) -> Result<(), AuthError> {
        let Some(nonce) = challenge.param("nonce") else {
            return Err(AuthError::NoNonce);
        };

        let algorithm = match challenge.param("algorithm") {
            Some(s) => Some(
                DigestAlgorithm::from_str(s)
                    .map_err(|_| AuthError::UnsupportedAlgorithm(s.to_string()))?,
            ),
            None => None,
        };
        let qop = match challenge.param("qop") {
            Some(s) => select_qop(s)?,
            None => None,
        };

        self.realm = challenge.realm().unwrap_or_default().to_string();
        self.opaque = challenge.param("opaque").map(|s| s.to_string());
        self.algorithm = algorithm.unwrap_or_default();
        self.algorithm_in_challenge = algorithm.is_some();
        self.qop = qop;
        if self.nonce != nonce {
            self.set_nonce(nonce);
            self.cnonce = new_cnonce();
        }
        self.session_key = None;
        Ok(())
    }

    fn set_nonce(&mut self, nonce: &str) {
        self.nonce = nonce.to_string();
        self.nc = 0;
    }

    fn input<'a>(&'a self, method: &'a str, uri: &'a str, body: &'a [u8]) -> DigestInput<'a> {
        DigestInput {
            username: self.username.as_original(),
            password: self.password.as_original(),
            realm: &self.realm,
            nonce: &self.nonce,
            cnonce: &self.cnonce,
            nc: self.nc,
            qop: self.qop,
            algorithm: self.algorithm,
            method,
            uri,
            body,
        }
    }

    /// The request URI of the last rendered header
    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Compute the Authorization value for a new request, the nonce count is increased.
    ///
    /// The returned request state is what the `Authentication-Info` of the
    /// matching response is checked against, it is only present if qop is in use.
    pub fn authorize(&mut self, method: &str, uri: &str, body: &[u8]) -> DigestAuthorization {
        self.nc = self.nc.wrapping_add(1);
        self.uri = uri.to_string();

        let input = self.input(method, uri, body);
        let ha1 = match &self.session_key {
            Some(key) => key.clone(),
            None => input.ha1(),
        };
        let response = input.response_with(&ha1, &input.ha2());
        let request = self.qop.map(|_| DigestRequest {
            nc: self.nc,
            cnonce: self.cnonce.clone(),
            rspauth: input.response_with(&ha1, &calc::md5_hex(&[b"", uri.as_bytes()])),
        });
        if self.algorithm == DigestAlgorithm::Md5Sess {
            self.session_key = Some(ha1);
        }

        let mut s = String::with_capacity(256);
        let _ = write!(
            s,
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            self.username, self.realm, self.nonce, uri, response
        );
        if self.algorithm_in_challenge {
            let _ = write!(s, ", algorithm={}", self.algorithm);
        }
        if self.qop.is_some() {
            let _ = write!(s, ", cnonce=\"{}\"", self.cnonce);
        }
        if let Some(opaque) = &self.opaque {
            let _ = write!(s, ", opaque=\"{opaque}\"");
        }
        if let Some(qop) = self.qop {
            let _ = write!(s, ", qop={qop}, nc={}", format_nc(self.nc));
        }
        self.response = Some(response);
        DigestAuthorization { value: s, request }
    }

    /// Check the Authentication-Info value sent with a successful response.
    ///
    /// The `rspauth` digest together with the echoed nc and cnonce is checked
    /// against the state of the request it answers. A `nextnonce` replaces
    /// the cached nonce.
    pub fn verify_authentication_info(
        &mut self,
        value: &str,
        request: Option<&DigestRequest>,
    ) -> Result<(), AuthError> {
        let params = crate::parse_params(value)?;
        if let Some(request) = request {
            request.verify(&params)?;
        }
        if let Some(next) = params.get("nextnonce") {
            self.set_nonce(next);
        }
        Ok(())
    }
}

/// A rendered Authorization value
#[derive(Clone, Debug)]
pub struct DigestAuthorization {
    pub value: String,
    pub request: Option<DigestRequest>,
}

/// What a successful response to one request must echo back.
///
/// The shared auth state moves on as other requests are authorized, so this
/// is kept with the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestRequest {
    nc: u32,
    cnonce: String,
    rspauth: String,
}

impl DigestRequest {
    #[inline]
    pub fn nc(&self) -> u32 {
        self.nc
    }

    #[inline]
    pub fn cnonce(&self) -> &str {
        &self.cnonce
    }

    fn verify(&self, params: &IndexMap<String, String>) -> Result<(), AuthError> {
        if let Some(nc) = params.get("nc") {
            match u32::from_str_radix(nc, 16) {
                Ok(n) if n == self.nc => {}
                _ => return Err(AuthError::MutualAuthFailed("nc mismatch")),
            }
        }
        if let Some(cnonce) = params.get("cnonce")
            && *cnonce != self.cnonce
        {
            return Err(AuthError::MutualAuthFailed("cnonce mismatch"));
        }
        if let Some(rspauth) = params.get("rspauth") {
            let rspauth = rspauth.to_ascii_lowercase();
            if !constant_time_eq::constant_time_eq(self.rspauth.as_bytes(), rspauth.as_bytes()) {
                return Err(AuthError::MutualAuthFailed("rspauth mismatch"));
            }
        }
        Ok(())
    }
}

/// Choose the qop from the offered list, plain auth is preferred
fn select_qop(value: &str) -> Result<Option<DigestQop>, AuthError> {
    let mut selected = None;
    let mut offered = false;
    for s in value.split(',') {
        let s = s.trim();
        if s.is_empty() {
            continue;
        }
        offered = true;
        match DigestQop::from_str(s) {
            Ok(DigestQop::Auth) => return Ok(Some(DigestQop::Auth)),
            Ok(DigestQop::AuthInt) => selected = Some(DigestQop::AuthInt),
            Err(_) => {}
        }
    }
    if offered && selected.is_none() {
        return Err(AuthError::UnsupportedQop(value.to_string()));
    }
    Ok(selected)
}

fn new_cnonce() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    calc::md5_hex(&[&now.to_le_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> DigestAuth {
        DigestAuth::new(
            Username::from_original("user").unwrap(),
            Password::from_original("secret").unwrap(),
        )
    }

    fn challenge(s: &str) -> Challenge {
        Challenge::parse_all(s).unwrap().remove(0)
    }

    fn server_params(value: &str) -> Challenge {
        let c = challenge(value);
        assert!(c.is_scheme("digest"));
        c
    }

    #[test]
    fn authorize_with_qop() {
        let mut a = auth();
        a.update_from_challenge(&challenge(
            r#"Digest realm="test", qop="auth", nonce="abc123""#,
        ))
        .unwrap();
        assert_eq!(a.nc(), 0);
        assert_eq!(a.cnonce().len(), 32);

        let value = a.authorize("POST", "/cimom", b"").value;
        let c = server_params(&value);
        assert_eq!(c.param("username"), Some("user"));
        assert_eq!(c.realm(), Some("test"));
        assert_eq!(c.param("uri"), Some("/cimom"));
        assert_eq!(c.param("qop"), Some("auth"));
        assert_eq!(c.param("nc"), Some("00000001"));
        assert_eq!(c.param("algorithm"), None);

        let expected = DigestInput {
            username: "user",
            password: "secret",
            realm: "test",
            nonce: "abc123",
            cnonce: c.param("cnonce").unwrap(),
            nc: 1,
            qop: Some(DigestQop::Auth),
            algorithm: DigestAlgorithm::Md5,
            method: "POST",
            uri: "/cimom",
            body: b"",
        }
        .response();
        assert_eq!(c.param("response"), Some(expected.as_str()));
        assert_eq!(a.last_response(), Some(expected.as_str()));

        let value = a.authorize("POST", "/cimom", b"").value;
        assert_eq!(server_params(&value).param("nc"), Some("00000002"));
    }

    #[test]
    fn authorize_without_qop() {
        let mut a = auth();
        a.update_from_challenge(&challenge(
            r#"Digest realm="r", nonce="n", opaque="o", algorithm=MD5"#,
        ))
        .unwrap();
        let value = a.authorize("M-POST", "/", b"").value;
        let c = server_params(&value);
        assert_eq!(c.param("opaque"), Some("o"));
        assert_eq!(c.param("algorithm"), Some("MD5"));
        assert_eq!(c.param("cnonce"), None);
        assert_eq!(c.param("nc"), None);
        assert_eq!(c.param("qop"), None);
    }

    #[test]
    fn new_nonce_resets_nc() {
        let mut a = auth();
        a.update_from_challenge(&challenge(r#"Digest realm="r", qop="auth", nonce="n1""#))
            .unwrap();
        a.authorize("POST", "/", b"");
        a.authorize("POST", "/", b"");
        assert_eq!(a.nc(), 2);

        // same nonce again, e.g. after a stale response
        a.update_from_challenge(&challenge(r#"Digest realm="r", qop="auth", nonce="n1""#))
            .unwrap();
        assert_eq!(a.nc(), 2);

        a.update_from_challenge(&challenge(r#"Digest realm="r", qop="auth", nonce="n2""#))
            .unwrap();
        assert_eq!(a.nc(), 0);
        assert_eq!(a.nonce(), "n2");
    }

    #[test]
    fn qop_selection() {
        let mut a = auth();
        a.update_from_challenge(&challenge(
            r#"Digest realm="r", qop="auth-int,auth", nonce="n""#,
        ))
        .unwrap();
        assert_eq!(a.qop(), Some(DigestQop::Auth));

        a.update_from_challenge(&challenge(r#"Digest realm="r", qop="auth-int", nonce="n""#))
            .unwrap();
        assert_eq!(a.qop(), Some(DigestQop::AuthInt));

        let e = a
            .update_from_challenge(&challenge(r#"Digest realm="r", qop="auth-conf", nonce="n""#))
            .unwrap_err();
        assert!(matches!(e, AuthError::UnsupportedQop(_)));
    }

    #[test]
    fn bad_challenge() {
        let mut a = auth();
        assert!(matches!(
            a.update_from_challenge(&challenge(r#"Digest realm="r""#)),
            Err(AuthError::NoNonce)
        ));
        assert!(matches!(
            a.update_from_challenge(&challenge(r#"Digest realm="r", nonce="n", algorithm=SHA-256"#)),
            Err(AuthError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn md5_sess_session_key() {
        let mut a = auth();
        a.update_from_challenge(&challenge(
            r#"Digest realm="r", qop="auth", nonce="n", algorithm="MD5-sess""#,
        ))
        .unwrap();
        let value = a.authorize("POST", "/", b"").value;
        let c = server_params(&value);
        assert_eq!(c.param("algorithm"), Some("MD5-sess"));
        let expected = DigestInput {
            username: "user",
            password: "secret",
            realm: "r",
            nonce: "n",
            cnonce: a.cnonce(),
            nc: 1,
            qop: Some(DigestQop::Auth),
            algorithm: DigestAlgorithm::Md5Sess,
            method: "POST",
            uri: "/",
            body: b"",
        }
        .response();
        assert_eq!(c.param("response"), Some(expected.as_str()));
    }

    fn rspauth_of(a: &DigestAuth, request: &DigestRequest) -> String {
        DigestInput {
            username: "user",
            password: "secret",
            realm: a.realm(),
            nonce: a.nonce(),
            cnonce: request.cnonce(),
            nc: request.nc(),
            qop: a.qop(),
            algorithm: a.algorithm(),
            method: "POST",
            uri: "/cimom",
            body: b"",
        }
        .rspauth()
    }

    #[test]
    fn mutual_auth() {
        let mut a = auth();
        a.update_from_challenge(&challenge(r#"Digest realm="test", qop="auth", nonce="abc""#))
            .unwrap();
        let request = a.authorize("POST", "/cimom", b"").request.unwrap();
        assert_eq!(request.nc(), 1);

        let rspauth = rspauth_of(&a, &request);
        let info = format!(
            r#"qop=auth, rspauth="{rspauth}", cnonce="{}", nc=00000001"#,
            a.cnonce()
        );
        a.verify_authentication_info(&info, Some(&request)).unwrap();

        let info = format!(r#"qop=auth, rspauth="{}", nc=00000001"#, "0".repeat(32));
        assert!(matches!(
            a.verify_authentication_info(&info, Some(&request)),
            Err(AuthError::MutualAuthFailed("rspauth mismatch"))
        ));

        let info = format!(r#"qop=auth, rspauth="{rspauth}", nc=00000002"#);
        assert!(matches!(
            a.verify_authentication_info(&info, Some(&request)),
            Err(AuthError::MutualAuthFailed("nc mismatch"))
        ));

        let info = format!(r#"qop=auth, rspauth="{rspauth}", cnonce="other""#);
        assert!(matches!(
            a.verify_authentication_info(&info, Some(&request)),
            Err(AuthError::MutualAuthFailed("cnonce mismatch"))
        ));
    }

    #[test]
    fn mutual_auth_interleaved() {
        let mut a = auth();
        a.update_from_challenge(&challenge(r#"Digest realm="test", qop="auth", nonce="abc""#))
            .unwrap();
        let first = a.authorize("POST", "/cimom", b"").request.unwrap();
        let second = a.authorize("POST", "/interop", b"").request.unwrap();
        assert_eq!(a.nc(), 2);
        assert_eq!(a.uri(), "/interop");

        // the answer to the first request arrives after the second was sent
        let info = format!(
            r#"qop=auth, rspauth="{}", cnonce="{}", nc=00000001"#,
            rspauth_of(&a, &first),
            first.cnonce()
        );
        a.verify_authentication_info(&info, Some(&first)).unwrap();
        assert!(matches!(
            a.verify_authentication_info(&info, Some(&second)),
            Err(AuthError::MutualAuthFailed("nc mismatch"))
        ));
    }

    #[test]
    fn no_request_state_without_qop() {
        let mut a = auth();
        a.update_from_challenge(&challenge(r#"Digest realm="test", nonce="abc""#))
            .unwrap();
        assert!(a.authorize("POST", "/cimom", b"").request.is_none());
        let info = format!(r#"rspauth="{}""#, "0".repeat(32));
        a.verify_authentication_info(&info, None).unwrap();
    }

    #[test]
    fn next_nonce() {
        let mut a = auth();
        a.update_from_challenge(&challenge(r#"Digest realm="test", qop="auth", nonce="abc""#))
            .unwrap();
        a.authorize("POST", "/cimom", b"");
        a.verify_authentication_info(r#"nextnonce="def""#, None).unwrap();
        assert_eq!(a.nonce(), "def");
        assert_eq!(a.nc(), 0);

        let value = a.authorize("POST", "/cimom", b"").value;
        let c = server_params(&value);
        assert_eq!(c.param("nonce"), Some("def"));
        assert_eq!(c.param("nc"), Some("00000001"));
    }
}
