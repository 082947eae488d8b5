/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use bytes::BufMut;
use http::{StatusCode, Version};

use crate::HeaderBag;

/// The head of a response sent by the listener
pub struct HttpServerResponse {
    pub version: Version,
    pub status: StatusCode,
    pub headers: HeaderBag,
}

impl HttpServerResponse {
    pub fn new(version: Version, status: StatusCode) -> Self {
        HttpServerResponse {
            version,
            status,
            headers: HeaderBag::new(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::<u8>::with_capacity(256);
        let version = if self.version == Version::HTTP_10 {
            "HTTP/1.0"
        } else {
            "HTTP/1.1"
        };
        let _ = write!(
            buf,
            "{version} {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or_default()
        );
        self.headers.write_to_buf(&mut buf);
        buf.put_slice(b"\r\n");
        buf
    }
}
