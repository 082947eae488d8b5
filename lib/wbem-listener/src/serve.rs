/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{StatusCode, Version};
use rustls::{ServerConnection, StreamOwned};

use wbem_http::server::{HttpRequestParseError, HttpServerRequest, HttpServerResponse};
use wbem_http::{ChunkedEncodeWriter, HttpBodyReader};
use wbem_types::net::RustlsServerConfig;

use crate::{ContentHandler, HandlerError, ListenerConfig};

const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";

const LINGER_TIMEOUT: Duration = Duration::from_millis(200);
const LINGER_MAX_SIZE: u64 = 64 * 1024;

trait ServerStream: Read + Write + Send {
    /// Finish sending, the peer will see the end of the stream
    fn finish(&mut self);
}

/// Drop what the peer still sends, so closing does not reset the connection
fn linger(tcp: &mut TcpStream) {
    let _ = tcp.shutdown(Shutdown::Write);
    if tcp.set_read_timeout(Some(LINGER_TIMEOUT)).is_ok() {
        let _ = io::copy(&mut tcp.take(LINGER_MAX_SIZE), &mut io::sink());
    }
}

impl ServerStream for TcpStream {
    fn finish(&mut self) {
        let _ = self.flush();
        linger(self);
    }
}

impl ServerStream for StreamOwned<ServerConnection, TcpStream> {
    fn finish(&mut self) {
        self.conn.send_close_notify();
        let _ = self.conn.complete_io(&mut self.sock);
        linger(&mut self.sock);
    }
}

fn timeout_opt(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

/// Everything a worker needs to answer one connection
pub(crate) struct ServeContext {
    handler: Arc<dyn ContentHandler>,
    tls: Option<RustlsServerConfig>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    max_header_size: usize,
    max_body_size: usize,
}

impl ServeContext {
    pub(crate) fn new(
        config: &ListenerConfig,
        tls: Option<RustlsServerConfig>,
        handler: Arc<dyn ContentHandler>,
    ) -> Self {
        ServeContext {
            handler,
            tls,
            read_timeout: timeout_opt(config.read_timeout()),
            write_timeout: timeout_opt(config.write_timeout()),
            max_header_size: config.max_header_size(),
            max_body_size: config.max_body_size(),
        }
    }

    fn tls_accept(
        &self,
        tls: &RustlsServerConfig,
        tcp: TcpStream,
    ) -> io::Result<StreamOwned<ServerConnection, TcpStream>> {
        let conn = ServerConnection::new(tls.driver.clone()).map_err(io::Error::other)?;
        let mut stream = StreamOwned::new(conn, tcp);

        let deadline = Instant::now() + tls.accept_timeout;
        while stream.conn.is_handshaking() {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "tls accept timed out"));
            }
            stream.sock.set_read_timeout(Some(left))?;
            stream.conn.complete_io(&mut stream.sock)?;
        }
        stream.sock.set_read_timeout(self.read_timeout)?;
        Ok(stream)
    }

    /// Answer one request and close the connection
    pub(crate) fn serve(&self, tcp: TcpStream, peer: SocketAddr) {
        if let Err(e) = tcp
            .set_read_timeout(self.read_timeout)
            .and_then(|_| tcp.set_write_timeout(self.write_timeout))
        {
            log::debug!("failed to set socket timeout for {peer}: {e}");
            return;
        }

        let stream: Box<dyn ServerStream> = match &self.tls {
            Some(tls) => match self.tls_accept(tls, tcp) {
                Ok(s) => Box::new(s),
                Err(e) => {
                    log::debug!("tls handshake with {peer} failed: {e}");
                    return;
                }
            },
            None => Box::new(tcp),
        };

        let mut reader = BufReader::new(stream);
        if let Err(e) = self.serve_request(&mut reader, peer) {
            log::debug!("failed to answer {peer}: {e}");
        }
        reader.get_mut().finish();
    }

    fn serve_request<S>(&self, reader: &mut BufReader<S>, peer: SocketAddr) -> io::Result<()>
    where
        S: Read + Write,
    {
        let req = match HttpServerRequest::parse(reader, self.max_header_size) {
            Ok(req) => req,
            Err(e) => {
                log::debug!("invalid request from {peer}: {e}");
                return match e.status_code() {
                    Some(status) => {
                        write_response(reader.get_mut(), Version::HTTP_11, status, None, &[], false)
                    }
                    None => Ok(()),
                };
            }
        };

        if !matches!(req.method.as_str(), "POST" | "M-POST") {
            let e = HttpRequestParseError::UnsupportedMethod(req.method.to_string());
            return self.reject(reader, &req, e);
        }
        if let Some(len) = req.content_length()
            && len > self.max_body_size as u64
        {
            return self.reject(reader, &req, HttpRequestParseError::TooLargeBody(len));
        }

        let mut body = Vec::new();
        let limit = self.max_body_size as u64 + 1;
        let mut body_reader =
            HttpBodyReader::new(&mut *reader, req.body_type(), self.max_header_size).take(limit);
        if let Err(e) = body_reader.read_to_end(&mut body) {
            log::debug!("failed to read request body from {peer}: {e}");
            return match e.kind() {
                io::ErrorKind::InvalidData => write_response(
                    reader.get_mut(),
                    req.version,
                    StatusCode::BAD_REQUEST,
                    None,
                    &[],
                    false,
                ),
                _ => Ok(()),
            };
        }
        if body.len() > self.max_body_size {
            let e = HttpRequestParseError::TooLargeBody(body.len() as u64);
            return self.reject(reader, &req, e);
        }

        let mut out = Vec::new();
        let handler = &self.handler;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle(&req, &mut body.as_slice(), &mut out, peer)
        }));
        let (status, cim_error) = match result {
            Ok(Ok(())) => (StatusCode::OK, None),
            Ok(Err(e)) => {
                log::warn!("handler failed for request from {peer}: {e}");
                let status = e.status();
                match e {
                    HandlerError::Protocol { cim_error, .. } => (status, cim_error),
                    _ => {
                        out.clear();
                        (status, None)
                    }
                }
            }
            Err(_) => {
                log::warn!("handler panicked for request from {peer}");
                out.clear();
                (StatusCode::NOT_IMPLEMENTED, None)
            }
        };

        write_response(
            reader.get_mut(),
            req.version,
            status,
            cim_error.as_deref(),
            &out,
            req.accept_chunked_response(),
        )
    }

    fn reject<S>(
        &self,
        reader: &mut BufReader<S>,
        req: &HttpServerRequest,
        e: HttpRequestParseError,
    ) -> io::Result<()>
    where
        S: Read + Write,
    {
        let status = e.status_code().unwrap_or(StatusCode::BAD_REQUEST);
        log::debug!("reject request: {e}");
        write_response(reader.get_mut(), req.version, status, None, &[], false)
    }
}

fn write_response<W: Write>(
    writer: &mut W,
    version: Version,
    status: StatusCode,
    cim_error: Option<&str>,
    body: &[u8],
    chunked: bool,
) -> io::Result<()> {
    let mut rsp = HttpServerResponse::new(version, status);
    rsp.headers.insert(http::header::CONNECTION.as_str(), "close");
    if !body.is_empty() {
        rsp.headers
            .insert(http::header::CONTENT_TYPE.as_str(), CONTENT_TYPE_XML);
    }
    if let Some(cim_error) = cim_error {
        rsp.headers.insert("CIMError", cim_error);
    }

    if chunked {
        rsp.headers
            .insert(http::header::TRANSFER_ENCODING.as_str(), "chunked");
        writer.write_all(&rsp.serialize())?;
        let mut chunked = ChunkedEncodeWriter::new(&mut *writer);
        chunked.write_all(body)?;
        chunked.finish()?;
    } else {
        rsp.headers.insert(
            http::header::CONTENT_LENGTH.as_str(),
            &body.len().to_string(),
        );
        writer.write_all(&rsp.serialize())?;
        writer.write_all(body)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_framing() {
        let mut buf = Vec::new();
        write_response(&mut buf, Version::HTTP_11, StatusCode::OK, None, b"<CIM/>", false).unwrap();
        assert_eq!(
            buf,
            b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Type: application/xml; charset=utf-8\r\nContent-Length: 6\r\n\r\n<CIM/>"
        );
    }

    #[test]
    fn chunked_framing() {
        let mut buf = Vec::new();
        write_response(
            &mut buf,
            Version::HTTP_11,
            StatusCode::BAD_REQUEST,
            Some("request-not-valid"),
            b"",
            true,
        )
        .unwrap();
        assert_eq!(
            buf,
            b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\nCIMError: request-not-valid\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n"
        );
    }
}
