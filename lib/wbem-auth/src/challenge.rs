/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use indexmap::IndexMap;

use crate::ChallengeParseError;

/// One auth scheme with its parameters, as found in a WWW-Authenticate value.
///
/// Parameter names are stored in lower case, the values are unquoted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Challenge {
    scheme: String,
    token: Option<String>,
    params: IndexMap<String, String>,
}

impl Challenge {
    pub fn new(scheme: &str) -> Self {
        Challenge {
            scheme: scheme.to_string(),
            token: None,
            params: IndexMap::new(),
        }
    }

    #[inline]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[inline]
    pub fn is_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    /// The bare value following the scheme, like the file path in `Local "/path"`
    #[inline]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn realm(&self) -> Option<&str> {
        self.param("realm")
    }

    pub fn set_param(&mut self, name: &str, value: &str) {
        self.params
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Parse all challenges in a header value
    pub fn parse_all(value: &str) -> Result<Vec<Challenge>, ChallengeParseError> {
        let mut parser = Parser::new(value);
        let mut challenges = Vec::new();

        loop {
            parser.skip_ws_and_commas();
            if parser.is_end() {
                break;
            }

            let start = parser.pos;
            let scheme = parser.read_token();
            if scheme.is_empty() {
                return Err(ChallengeParseError::NoSchemeFound(start));
            }
            let mut challenge = Challenge::new(scheme);

            parser.skip_ws();
            if parser.peek() == Some(b'"') {
                challenge.token = Some(parser.read_quoted()?);
            }
            parser.parse_params(&mut challenge.params, true)?;
            challenges.push(challenge);
        }

        if challenges.is_empty() {
            return Err(ChallengeParseError::Empty);
        }
        Ok(challenges)
    }
}

/// Parse a bare parameter list, like the value of Authentication-Info
pub fn parse_params(value: &str) -> Result<IndexMap<String, String>, ChallengeParseError> {
    let mut parser = Parser::new(value);
    let mut params = IndexMap::new();
    parser.parse_params(&mut params, false)?;
    Ok(params)
}

struct Parser<'a> {
    buf: &'a [u8],
    s: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Parser {
            buf: s.as_bytes(),
            s,
            pos: 0,
        }
    }

    fn is_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t') = self.peek() {
            self.pos += 1;
        }
    }

    fn skip_ws_and_commas(&mut self) {
        while let Some(b' ' | b'\t' | b',') = self.peek() {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> ChallengeParseError {
        let c = self.s[self.pos..].chars().next().unwrap_or_default();
        ChallengeParseError::UnexpectedChar(c, self.pos)
    }

    /// Read an unquoted token, which ends at whitespace, comma, equals or quote
    fn read_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b' ' | b'\t' | b',' | b'=' | b'"') {
                break;
            }
            self.pos += 1;
        }
        &self.s[start..self.pos]
    }

    fn read_quoted(&mut self) -> Result<String, ChallengeParseError> {
        // skip the opening quote
        self.pos += 1;
        let mut value = String::new();
        let mut start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    value.push_str(&self.s[start..self.pos]);
                    self.pos += 1;
                    return Ok(value);
                }
                b'\\' if self.pos + 1 < self.buf.len() => {
                    value.push_str(&self.s[start..self.pos]);
                    self.pos += 1;
                    start = self.pos;
                    // keep the escaped char, which may be multi-byte
                    let c = self.s[self.pos..].chars().next().unwrap_or_default();
                    self.pos += c.len_utf8();
                }
                _ => self.pos += 1,
            }
        }
        Err(ChallengeParseError::UnterminatedQuote)
    }

    /// Whether the token at the current position is followed by '='
    fn next_is_param(&self) -> bool {
        let mut p = self.pos;
        while p < self.buf.len() && !matches!(self.buf[p], b' ' | b'\t' | b',' | b'=' | b'"') {
            p += 1;
        }
        if p == self.pos {
            return false;
        }
        while p < self.buf.len() && matches!(self.buf[p], b' ' | b'\t') {
            p += 1;
        }
        p < self.buf.len() && self.buf[p] == b'='
    }

    /// Parse `name=value` pairs separated by commas.
    ///
    /// With `stop_at_scheme` set, a token not followed by '=' after a comma
    /// starts the next challenge and ends this list.
    fn parse_params(
        &mut self,
        params: &mut IndexMap<String, String>,
        stop_at_scheme: bool,
    ) -> Result<(), ChallengeParseError> {
        let mut need_comma = false;
        loop {
            self.skip_ws();
            let Some(b) = self.peek() else {
                return Ok(());
            };

            if b == b',' {
                self.skip_ws_and_commas();
                if self.is_end() {
                    return Ok(());
                }
                if stop_at_scheme && !self.next_is_param() {
                    return Ok(());
                }
            } else if need_comma {
                return Err(self.unexpected());
            }

            let name = self.read_token();
            if name.is_empty() {
                return Err(self.unexpected());
            }
            self.skip_ws();
            if self.peek() != Some(b'=') {
                return Err(ChallengeParseError::NoEqualsFound(name.to_string()));
            }
            self.pos += 1;
            self.skip_ws();

            let value = match self.peek() {
                Some(b'"') => self.read_quoted()?,
                _ => {
                    let v = self.read_token();
                    if v.is_empty() {
                        return Err(ChallengeParseError::NoValueFound(name.to_string()));
                    }
                    v.to_string()
                }
            };
            params.insert(name.to_ascii_lowercase(), value);
            need_comma = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_separators() {
        let challenges =
            Challenge::parse_all(r#"Digest realm="a,b", qop="auth,auth-int", nonce="n1""#)
                .unwrap();
        assert_eq!(challenges.len(), 1);
        let c = &challenges[0];
        assert!(c.is_scheme("digest"));
        assert_eq!(c.realm(), Some("a,b"));
        assert_eq!(c.param("qop"), Some("auth,auth-int"));
        assert_eq!(c.param("NONCE"), Some("n1"));
    }

    #[test]
    fn quoted_equals() {
        let challenges = Challenge::parse_all(r#"Digest realm="x=y", opaque="=,=""#).unwrap();
        assert_eq!(challenges[0].realm(), Some("x=y"));
        assert_eq!(challenges[0].param("opaque"), Some("=,="));
    }

    #[test]
    fn multiple_challenges() {
        let challenges = Challenge::parse_all(
            r#"Basic realm="cimom", Digest realm="cimom", algorithm=MD5-sess, nonce="abc", stale=false"#,
        )
        .unwrap();
        assert_eq!(challenges.len(), 2);
        assert_eq!(challenges[0].scheme(), "Basic");
        assert_eq!(challenges[0].realm(), Some("cimom"));
        assert_eq!(challenges[1].scheme(), "Digest");
        assert_eq!(challenges[1].param("algorithm"), Some("MD5-sess"));
        assert_eq!(challenges[1].param("stale"), Some("false"));
        let names: Vec<&str> = challenges[1].params().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["realm", "algorithm", "nonce", "stale"]);
    }

    #[test]
    fn scheme_only() {
        let challenges = Challenge::parse_all("Negotiate, Basic realm=x").unwrap();
        assert_eq!(challenges.len(), 2);
        assert_eq!(challenges[0].scheme(), "Negotiate");
        assert_eq!(challenges[0].params().count(), 0);
        assert_eq!(challenges[1].realm(), Some("x"));
    }

    #[test]
    fn bare_token() {
        let challenges = Challenge::parse_all(r#"Local "/var/run/pegasus/cimclient_x""#).unwrap();
        assert_eq!(challenges.len(), 1);
        assert!(challenges[0].is_scheme("local"));
        assert_eq!(challenges[0].token(), Some("/var/run/pegasus/cimclient_x"));
    }

    #[test]
    fn escaped_quote() {
        let challenges = Challenge::parse_all(r#"Basic realm="say \"hi\"""#).unwrap();
        assert_eq!(challenges[0].realm(), Some(r#"say "hi""#));
    }

    #[test]
    fn malformed() {
        assert_eq!(Challenge::parse_all(""), Err(ChallengeParseError::Empty));
        assert_eq!(Challenge::parse_all(" , "), Err(ChallengeParseError::Empty));
        assert_eq!(
            Challenge::parse_all(r#"Digest realm="abc"#),
            Err(ChallengeParseError::UnterminatedQuote)
        );
        assert_eq!(
            Challenge::parse_all("Digest realm="),
            Err(ChallengeParseError::NoValueFound("realm".to_string()))
        );
        assert!(Challenge::parse_all(r#"Digest realm="a" nonce="b""#).is_err());
        assert!(Challenge::parse_all("=realm").is_err());
    }

    #[test]
    fn bare_params() {
        let params =
            parse_params(r#"nextnonce="n2", qop=auth, rspauth="abcd", cnonce="c", nc=00000001"#)
                .unwrap();
        assert_eq!(params.get("nextnonce").map(|s| s.as_str()), Some("n2"));
        assert_eq!(params.get("nc").map(|s| s.as_str()), Some("00000001"));
        assert_eq!(params.len(), 5);
    }
}
