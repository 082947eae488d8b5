/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use bytes::BufMut;
use http::Method;

use crate::HeaderBag;

pub struct HttpClientRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderBag,
}

impl HttpClientRequest {
    pub fn new(method: Method, uri: &str) -> Self {
        HttpClientRequest {
            method,
            uri: uri.to_string(),
            headers: HeaderBag::new(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::<u8>::with_capacity(512);
        let _ = write!(buf, "{} {} HTTP/1.1\r\n", self.method, self.uri);
        self.headers.write_to_buf(&mut buf);
        buf.put_slice(b"\r\n");
        buf
    }
}
