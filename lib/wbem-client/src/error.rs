/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use wbem_auth::AuthError;
use wbem_http::client::HttpResponseParseError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect failed: {0}")]
    ConnectFailed(io::Error),
    #[error("tls handshake failed: {0}")]
    TlsHandshakeFailed(io::Error),
    #[error("invalid tls server name: {0}")]
    InvalidTlsServerName(String),
    #[error("write failed: {0}")]
    WriteFailed(io::Error),
    #[error("read failed: {0}")]
    ReadFailed(io::Error),
    #[error("timed out: {0}")]
    Timeout(io::Error),
    #[error("reused connection closed by remote before the response")]
    StaleConnection,
    #[error("unexpected eof")]
    UnexpectedEof,
    #[error("invalid response: {0}")]
    InvalidResponse(HttpResponseParseError),
    #[error("auth failed: {0}")]
    Auth(#[from] AuthError),
    #[error("still unauthorized after the auth retry")]
    AuthRetriesExhausted,
    #[error("proxy authentication required: {0}")]
    ProxyAuthenticationRequired(String),
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid config: {0:?}")]
    InvalidConfig(anyhow::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("connection pool closed")]
    PoolClosed,
}

impl ClientError {
    fn is_timeout_kind(e: &io::Error) -> bool {
        matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
    }

    pub(crate) fn from_read(e: io::Error) -> Self {
        if Self::is_timeout_kind(&e) {
            ClientError::Timeout(e)
        } else if e.kind() == io::ErrorKind::UnexpectedEof {
            ClientError::UnexpectedEof
        } else {
            ClientError::ReadFailed(e)
        }
    }

    pub(crate) fn from_write(e: io::Error) -> Self {
        if Self::is_timeout_kind(&e) {
            ClientError::Timeout(e)
        } else {
            ClientError::WriteFailed(e)
        }
    }

    pub(crate) fn from_connect(e: io::Error) -> Self {
        if Self::is_timeout_kind(&e) {
            ClientError::Timeout(e)
        } else {
            ClientError::ConnectFailed(e)
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }

    /// Failures before the request reached the remote, it may be sent again on a new socket.
    ///
    /// A failed read is not retried, the request may have been processed already.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectFailed(_)
                | ClientError::WriteFailed(_)
                | ClientError::StaleConnection
        )
    }

    #[inline]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(_)
                | ClientError::AuthRetriesExhausted
                | ClientError::ProxyAuthenticationRequired(_)
        )
    }
}

impl From<HttpResponseParseError> for ClientError {
    fn from(e: HttpResponseParseError) -> Self {
        match e {
            HttpResponseParseError::IoFailed(e) => ClientError::from_read(e),
            HttpResponseParseError::UnexpectedEof | HttpResponseParseError::RemoteClosed => {
                ClientError::UnexpectedEof
            }
            e => ClientError::InvalidResponse(e),
        }
    }
}
