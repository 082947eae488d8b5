/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix16;

use super::HttpLineParseError;
use crate::trim_line_end;

pub struct HttpChunkedLine<'a> {
    pub chunk_size: u64,
    pub extension: Option<&'a str>,
}

impl<'a> HttpChunkedLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpChunkedLine<'a>, HttpLineParseError> {
        let buf = trim_line_end(buf);
        let (chunk_size, offset) = u64::from_radix_16(buf);
        if offset == 0 {
            return Err(HttpLineParseError::InvalidChunkSize);
        }

        match buf.get(offset) {
            None => Ok(HttpChunkedLine {
                chunk_size,
                extension: None,
            }),
            Some(b';') => {
                let extension = std::str::from_utf8(&buf[offset + 1..])?.trim();
                Ok(HttpChunkedLine {
                    chunk_size,
                    extension: Some(extension),
                })
            }
            Some(b' ' | b'\t') => {
                // whitespace before the extension
                let left = std::str::from_utf8(&buf[offset..])?.trim_start();
                match left.strip_prefix(';') {
                    Some(ext) => Ok(HttpChunkedLine {
                        chunk_size,
                        extension: Some(ext.trim()),
                    }),
                    None => Err(HttpLineParseError::InvalidChunkSize),
                }
            }
            Some(_) => Err(HttpLineParseError::InvalidChunkSize),
        }
    }
}
