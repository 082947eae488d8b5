/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix10;
use http::Version;

use super::HttpLineParseError;
use crate::trim_line_end;

pub struct HttpStatusLine<'a> {
    pub version: Version,
    pub code: u16,
    pub reason: &'a str,
}

impl<'a> HttpStatusLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpStatusLine<'a>, HttpLineParseError> {
        const MINIMAL_LENGTH: usize = 12; // HTTP/1.x XYZ

        let buf = trim_line_end(buf);
        if buf.len() < MINIMAL_LENGTH {
            return Err(HttpLineParseError::NotLongEnough);
        }

        let Some(p) = memchr::memchr(b' ', buf) else {
            return Err(HttpLineParseError::NoDelimiterFound(' '));
        };
        let version = super::parse_version(&buf[0..p])?;

        let left = &buf[p + 1..];
        let (code, len) = u16::from_radix_10(left);
        if len != 3 {
            return Err(HttpLineParseError::InvalidStatusCode);
        }

        let reason = match left.get(len) {
            None => "",
            Some(b' ') => std::str::from_utf8(&left[len + 1..])?.trim(),
            Some(_) => return Err(HttpLineParseError::InvalidStatusCode),
        };

        Ok(HttpStatusLine {
            version,
            code,
            reason,
        })
    }
}
