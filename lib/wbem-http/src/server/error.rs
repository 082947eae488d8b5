/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use http::StatusCode;
use thiserror::Error;

use crate::{HttpHeaderReadError, HttpLineParseError};

#[derive(Debug, Error)]
pub enum HttpRequestParseError {
    #[error("client closed")]
    ClientClosed,
    #[error("client closed in the middle of the request header")]
    UnexpectedEof,
    #[error("too large header, should be less than {0}")]
    TooLargeHeader(usize),
    #[error("invalid method line: {0}")]
    InvalidMethodLine(HttpLineParseError),
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
    #[error("invalid chunked transfer-encoding")]
    InvalidChunkedTransferEncoding,
    #[error("invalid content length")]
    InvalidContentLength,
    #[error("too large body, should be less than {0}")]
    TooLargeBody(u64),
    #[error("io failed: {0:?}")]
    IoFailed(#[from] io::Error),
}

impl From<HttpHeaderReadError> for HttpRequestParseError {
    fn from(e: HttpHeaderReadError) -> Self {
        match e {
            HttpHeaderReadError::UnexpectedEof => HttpRequestParseError::UnexpectedEof,
            HttpHeaderReadError::TooLargeHeader(n) => HttpRequestParseError::TooLargeHeader(n),
            HttpHeaderReadError::IoFailed(e) => HttpRequestParseError::IoFailed(e),
        }
    }
}

impl HttpRequestParseError {
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            HttpRequestParseError::IoFailed(_)
            | HttpRequestParseError::ClientClosed
            | HttpRequestParseError::UnexpectedEof => None,
            HttpRequestParseError::TooLargeHeader(_) => {
                Some(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE)
            }
            HttpRequestParseError::TooLargeBody(_) => Some(StatusCode::PAYLOAD_TOO_LARGE),
            HttpRequestParseError::UnsupportedMethod(_)
            | HttpRequestParseError::InvalidChunkedTransferEncoding => {
                Some(StatusCode::NOT_IMPLEMENTED)
            }
            _ => Some(StatusCode::BAD_REQUEST),
        }
    }
}
