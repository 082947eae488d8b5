/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use http::{Method, Version};

use super::HttpLineParseError;
use crate::trim_line_end;

pub struct HttpMethodLine<'a> {
    pub method: Method,
    pub uri: &'a str,
    pub version: Version,
}

impl<'a> HttpMethodLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpMethodLine<'a>, HttpLineParseError> {
        let buf = trim_line_end(buf);

        let Some(p1) = memchr::memchr(b' ', buf) else {
            return Err(HttpLineParseError::NoDelimiterFound(' '));
        };
        let Some(p2) = memchr::memrchr(b' ', buf) else {
            return Err(HttpLineParseError::NoDelimiterFound(' '));
        };
        if p1 == p2 {
            return Err(HttpLineParseError::NotLongEnough);
        }

        let method =
            Method::from_bytes(&buf[0..p1]).map_err(|_| HttpLineParseError::InvalidMethod)?;
        let uri = std::str::from_utf8(&buf[p1 + 1..p2])?.trim();
        if uri.is_empty() || uri.contains(' ') {
            return Err(HttpLineParseError::InvalidRequestTarget);
        }
        let version = super::parse_version(&buf[p2 + 1..])?;

        Ok(HttpMethodLine {
            method,
            uri,
            version,
        })
    }
}
