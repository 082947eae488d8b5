/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::{HttpHeaderReadError, HttpLineParseError};

#[derive(Debug, Error)]
pub enum HttpResponseParseError {
    #[error("remote closed")]
    RemoteClosed,
    #[error("remote closed in the middle of the response header")]
    UnexpectedEof,
    #[error("too large header, should be less than {0}")]
    TooLargeHeader(usize),
    #[error("invalid status line: {0}")]
    InvalidStatusLine(HttpLineParseError),
    #[error("invalid content length")]
    InvalidContentLength,
    #[error("io failed: {0:?}")]
    IoFailed(#[from] io::Error),
}

impl From<HttpHeaderReadError> for HttpResponseParseError {
    fn from(e: HttpHeaderReadError) -> Self {
        match e {
            HttpHeaderReadError::UnexpectedEof => HttpResponseParseError::UnexpectedEof,
            HttpHeaderReadError::TooLargeHeader(n) => HttpResponseParseError::TooLargeHeader(n),
            HttpHeaderReadError::IoFailed(e) => HttpResponseParseError::IoFailed(e),
        }
    }
}
