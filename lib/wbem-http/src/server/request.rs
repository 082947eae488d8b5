/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::BufRead;

use http::{Method, Version};

use super::HttpRequestParseError;
use crate::header;
use crate::{HeaderBag, HttpBodyType, HttpMethodLine, LimitedBufReadExt};

pub struct HttpServerRequest {
    pub method: Method,
    pub uri: String,
    pub version: Version,
    pub headers: HeaderBag,
    content_length: Option<u64>,
    chunked_transfer: bool,
    origin_header_size: usize,
}

impl HttpServerRequest {
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

    /// A request without chunked encoding or Content-Length has no body
    pub fn body_type(&self) -> Option<HttpBodyType> {
        if self.chunked_transfer {
            Some(HttpBodyType::Chunked)
        } else {
            match self.content_length {
                Some(0) | None => None,
                Some(len) => Some(HttpBodyType::ContentLength(len)),
            }
        }
    }

    /// Whether the response can be sent with chunked encoding
    pub fn accept_chunked_response(&self) -> bool {
        if self.version != Version::HTTP_11 {
            return false;
        }
        self.headers
            .get(http::header::TE.as_str())
            .map(header::te_accepts_chunked)
            .unwrap_or(false)
    }

    pub fn parse<R>(reader: &mut R, max_header_size: usize) -> Result<Self, HttpRequestParseError>
    where
        R: BufRead,
    {
        let mut line_buf = Vec::<u8>::with_capacity(128);
        let mut header_size: usize = 0;

        let (found, nr) = reader.limited_read_until(b'\n', max_header_size, &mut line_buf)?;
        if nr == 0 {
            return Err(HttpRequestParseError::ClientClosed);
        }
        if !found {
            return if nr < max_header_size {
                Err(HttpRequestParseError::UnexpectedEof)
            } else {
                Err(HttpRequestParseError::TooLargeHeader(max_header_size))
            };
        }
        header_size += nr;

        let line =
            HttpMethodLine::parse(&line_buf).map_err(HttpRequestParseError::InvalidMethodLine)?;
        let (method, uri, version) = (line.method, line.uri.to_string(), line.version);

        let headers = HeaderBag::read_from(reader, max_header_size, &mut header_size)?;
        let mut req = HttpServerRequest {
            method,
            uri,
            version,
            headers,
            content_length: None,
            chunked_transfer: false,
            origin_header_size: header_size,
        };
        req.check_framing()?;
        Ok(req)
    }

    fn check_framing(&mut self) -> Result<(), HttpRequestParseError> {
        if let Some(v) = self.headers.get(http::header::TRANSFER_ENCODING.as_str()) {
            if header::is_chunked_transfer(v) {
                self.chunked_transfer = true;
                return Ok(());
            }
            // the length of the body can not be determined
            return Err(HttpRequestParseError::InvalidChunkedTransferEncoding);
        }
        if let Some(v) = self.headers.get(http::header::CONTENT_LENGTH.as_str()) {
            let len =
                header::parse_content_length(v).ok_or(HttpRequestParseError::InvalidContentLength)?;
            self.content_length = Some(len);
        }
        Ok(())
    }
}
