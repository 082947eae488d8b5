/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::BufRead;

use http::{Method, Version};

use super::HttpResponseParseError;
use crate::header::{self, Connection};
use crate::{HeaderBag, HttpBodyType, HttpStatusLine, LimitedBufReadExt};

pub struct HttpClientResponse {
    pub version: Version,
    pub code: u16,
    pub reason: String,
    pub headers: HeaderBag,
    keep_alive: bool,
    content_length: Option<u64>,
    chunked_transfer: bool,
    origin_header_size: usize,
}

impl HttpClientResponse {
    fn new(version: Version, code: u16, reason: String, headers: HeaderBag) -> Self {
        HttpClientResponse {
            version,
            code,
            reason,
            headers,
            keep_alive: false,
            content_length: None,
            chunked_transfer: false,
            origin_header_size: 0,
        }
    }

    #[inline]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    #[inline]
    pub fn chunked_transfer(&self) -> bool {
        self.chunked_transfer
    }

    #[inline]
    pub fn origin_header_size(&self) -> usize {
        self.origin_header_size
    }

    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    fn expect_no_body(&self, method: &Method) -> bool {
        self.code < 200 || self.code == 204 || self.code == 304 || method.eq(&Method::HEAD)
    }

    /// Select the body framing, chunked first and then Content-Length.
    ///
    /// A response without either is empty if the connection is persistent,
    /// otherwise the body ends when the remote closes the connection.
    pub fn body_type(&self, method: &Method) -> Option<HttpBodyType> {
        if self.expect_no_body(method) {
            None
        } else if self.chunked_transfer {
            Some(HttpBodyType::Chunked)
        } else if let Some(len) = self.content_length {
            if len > 0 {
                Some(HttpBodyType::ContentLength(len))
            } else {
                None
            }
        } else if self.keep_alive {
            None
        } else {
            Some(HttpBodyType::ReadUntilEnd)
        }
    }

    pub fn parse<R>(reader: &mut R, max_header_size: usize) -> Result<Self, HttpResponseParseError>
    where
        R: BufRead,
    {
        let mut line_buf = Vec::<u8>::with_capacity(128);
        let mut header_size: usize = 0;

        let (found, nr) = reader.limited_read_until(b'\n', max_header_size, &mut line_buf)?;
        if nr == 0 {
            return Err(HttpResponseParseError::RemoteClosed);
        }
        if !found {
            return if nr < max_header_size {
                Err(HttpResponseParseError::UnexpectedEof)
            } else {
                Err(HttpResponseParseError::TooLargeHeader(max_header_size))
            };
        }
        header_size += nr;

        let status =
            HttpStatusLine::parse(&line_buf).map_err(HttpResponseParseError::InvalidStatusLine)?;
        let (version, code, reason) = (status.version, status.code, status.reason.to_string());

        let headers = HeaderBag::read_from(reader, max_header_size, &mut header_size)?;
        let mut rsp = HttpClientResponse::new(version, code, reason, headers);
        rsp.origin_header_size = header_size;
        rsp.check_framing()?;
        rsp.keep_alive = rsp.decide_keep_alive();
        Ok(rsp)
    }

    fn check_framing(&mut self) -> Result<(), HttpResponseParseError> {
        if let Some(v) = self.headers.get(http::header::TRANSFER_ENCODING.as_str()) {
            self.chunked_transfer = header::is_chunked_transfer(v);
        }
        if self.chunked_transfer {
            // Content-Length is ignored if chunked
            return Ok(());
        }
        if let Some(v) = self.headers.get(http::header::CONTENT_LENGTH.as_str()) {
            let len = header::parse_content_length(v)
                .ok_or(HttpResponseParseError::InvalidContentLength)?;
            self.content_length = Some(len);
        }
        Ok(())
    }

    fn decide_keep_alive(&self) -> bool {
        if let Some(v) = self.headers.get(http::header::CONNECTION.as_str()) {
            match Connection::parse(v) {
                Some(Connection::Close) => return false,
                Some(Connection::KeepAlive) => return true,
                None => {}
            }
        }
        if self.version == Version::HTTP_11 {
            return true;
        }
        if self.headers.contains("keep-alive") {
            return true;
        }
        self.chunked_transfer || self.content_length.is_some()
    }
}
