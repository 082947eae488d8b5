/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::HttpLineParseError;
use crate::trim_line_end;

pub struct HttpHeaderLine<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> HttpHeaderLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpHeaderLine<'a>, HttpLineParseError> {
        let line = std::str::from_utf8(trim_line_end(buf))?;
        let Some(p) = memchr::memchr(b':', line.as_bytes()) else {
            return Err(HttpLineParseError::NoDelimiterFound(':'));
        };

        let name = line[0..p].trim();
        if name.is_empty() || !name.bytes().all(is_token_char) {
            return Err(HttpLineParseError::InvalidHeaderName);
        }
        let value = line[p + 1..].trim();

        Ok(HttpHeaderLine { name, value })
    }
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let h = HttpHeaderLine::parse(b"Content-Type: application/xml; charset=utf-8\r\n").unwrap();
        assert_eq!(h.name, "Content-Type");
        assert_eq!(h.value, "application/xml; charset=utf-8");
    }

    #[test]
    fn split_on_first_colon() {
        let h = HttpHeaderLine::parse(b"Host: [::1]:5988\r\n").unwrap();
        assert_eq!(h.name, "Host");
        assert_eq!(h.value, "[::1]:5988");
    }

    #[test]
    fn empty_value() {
        let h = HttpHeaderLine::parse(b"CIMError:\r\n").unwrap();
        assert_eq!(h.name, "CIMError");
        assert_eq!(h.value, "");
    }

    #[test]
    fn invalid() {
        assert!(HttpHeaderLine::parse(b"no delimiter here\r\n").is_err());
        assert!(HttpHeaderLine::parse(b": value\r\n").is_err());
        assert!(HttpHeaderLine::parse(b"bad name: value\r\n").is_err());
    }
}
