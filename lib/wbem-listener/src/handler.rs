/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{Read, Write};
use std::net::SocketAddr;

use wbem_http::server::HttpServerRequest;

use crate::HandlerError;

/// Processes the body of one inbound request.
///
/// Whatever is written to `writer` is sent as the response body.
pub trait ContentHandler: Send + Sync {
    fn handle(
        &self,
        request: &HttpServerRequest,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        peer: SocketAddr,
    ) -> Result<(), HandlerError>;
}

impl<F> ContentHandler for F
where
    F: Fn(&HttpServerRequest, &mut dyn Read, &mut dyn Write, SocketAddr) -> Result<(), HandlerError>
        + Send
        + Sync,
{
    fn handle(
        &self,
        request: &HttpServerRequest,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        peer: SocketAddr,
    ) -> Result<(), HandlerError> {
        self(request, reader, writer, peer)
    }
}
