/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::Arc;

use http::Method;

use wbem_auth::SharedAuthInfo;
use wbem_auth::digest::DigestRequest;
use wbem_http::client::{HttpClientRequest, HttpClientResponse, HttpResponseParseError};
use wbem_http::header::{AUTHENTICATION_INFO, PROXY_AUTHENTICATE};
use wbem_http::{HeaderBag, HttpBodyReader};
use wbem_types::net::Destination;

use crate::auth::lock_info;
use crate::socket::{SocketCloser, SocketStream};
use crate::{ClientAuth, ClientError, SocketConfig, SocketFactory};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
    Closed,
}

/// One request to be sent
pub struct RequestParts<'a> {
    pub method: &'a Method,
    pub uri: &'a str,
    pub headers: &'a HeaderBag,
    pub body: &'a [u8],
}

/// A single HTTP connection to one destination.
///
/// The socket is opened on first use, and again after it has been
/// disconnected. Only one request is in flight at any time.
pub struct HttpConnection {
    id: u64,
    destination: Destination,
    factory: Arc<dyn SocketFactory>,
    socket_config: SocketConfig,
    max_header_size: usize,
    closer: Arc<SocketCloser>,
    state: ConnectionState,
    stream: Option<BufReader<Box<dyn SocketStream>>>,
    served: usize,
    keep_alive: bool,
    auth: Option<SharedAuthInfo>,
    /// Digest state of the request in flight
    auth_digest: Option<DigestRequest>,
}

impl HttpConnection {
    pub(crate) fn new(
        id: u64,
        destination: Destination,
        factory: Arc<dyn SocketFactory>,
        socket_config: SocketConfig,
        max_header_size: usize,
    ) -> Self {
        HttpConnection {
            id,
            destination,
            factory,
            socket_config,
            max_header_size,
            closer: Arc::new(SocketCloser::default()),
            state: ConnectionState::Unconnected,
            stream: None,
            served: 0,
            keep_alive: false,
            auth: None,
            auth_digest: None,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Responses received on the current socket
    #[inline]
    pub fn served(&self) -> usize {
        self.served
    }

    /// Whether the last response allows the socket to be reused
    #[inline]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    #[inline]
    pub(crate) fn closer(&self) -> &Arc<SocketCloser> {
        &self.closer
    }

    fn ensure_connected(&mut self) -> Result<(), ClientError> {
        if self.state == ConnectionState::Closed || self.closer.is_closed() {
            self.state = ConnectionState::Closed;
            return Err(ClientError::ConnectionClosed);
        }
        if self.stream.is_some() {
            return Ok(());
        }

        let socket = self.factory.connect(&self.destination, &self.socket_config)?;
        self.closer.set(socket.tcp);
        self.stream = Some(BufReader::new(socket.stream));
        self.state = ConnectionState::Connected;
        self.served = 0;
        log::debug!("connection {} to {} opened", self.id, self.destination);
        Ok(())
    }

    /// Drop the socket, a new one will be opened for the next request
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            log::debug!("connection {} to {} disconnected", self.id, self.destination);
        }
        self.closer.shutdown();
        self.keep_alive = false;
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Unconnected;
        }
    }

    /// Drop the socket and never connect again
    pub fn close(&mut self) {
        self.disconnect();
        self.closer.close();
        self.state = ConnectionState::Closed;
    }

    fn stream_mut(&mut self) -> io::Result<&mut BufReader<Box<dyn SocketStream>>> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))
    }

    fn request_head(&mut self, req: &RequestParts<'_>) -> Result<Vec<u8>, ClientError> {
        let mut request = HttpClientRequest::new(req.method.clone(), req.uri);
        for (name, value) in req.headers.iter() {
            request.headers.insert(name, value);
        }
        self.auth_digest = None;
        if let Some(auth) = &self.auth {
            let mut info = lock_info(auth);
            let header = info.header_value(req.method.as_str(), req.uri, req.body)?;
            request.headers.insert(info.header_name(false), &header.value);
            self.auth_digest = header.digest;
        }
        Ok(request.serialize())
    }

    /// Write one request and read the head of its final response
    fn exchange(&mut self, head: &[u8], body: &[u8]) -> Result<HttpClientResponse, ClientError> {
        self.ensure_connected()?;
        let id = self.id;
        let reused = self.served > 0;
        let max_header_size = self.max_header_size;

        let stream = self.stream_mut().map_err(ClientError::WriteFailed)?;
        let writer = stream.get_mut();
        writer.write_all(head).map_err(ClientError::from_write)?;
        if !body.is_empty() {
            writer.write_all(body).map_err(ClientError::from_write)?;
        }
        writer.flush().map_err(ClientError::from_write)?;

        loop {
            let rsp = match HttpClientResponse::parse(stream, max_header_size) {
                Ok(rsp) => rsp,
                Err(HttpResponseParseError::RemoteClosed) if reused => {
                    return Err(ClientError::StaleConnection);
                }
                Err(e) => return Err(e.into()),
            };
            if rsp.code == 100 {
                log::trace!("connection {id} got 100 Continue");
                continue;
            }
            self.served += 1;
            self.keep_alive = rsp.keep_alive();
            return Ok(rsp);
        }
    }

    /// Read and drop the body of a response that is not returned to the caller
    fn skip_body(&mut self, rsp: &HttpClientResponse, method: &Method) {
        let body_type = rsp.body_type(method);
        let max_header_size = self.max_header_size;
        let keep_alive = self.keep_alive;
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        let mut reader = HttpBodyReader::new(stream, body_type, max_header_size);
        match io::copy(&mut reader, &mut io::sink()) {
            Ok(_) if keep_alive => {}
            Ok(_) => self.disconnect(),
            Err(e) => {
                log::debug!("connection {} failed to skip body: {e}", self.id);
                self.disconnect();
            }
        }
    }

    /// Send a request and return the head of the final response.
    ///
    /// A failed connect or write is retried once on a new socket, and a 401
    /// response is answered once with new credentials. The two retries are
    /// independent of each other. The response body is left in the
    /// connection and should be read through it.
    pub fn send(
        &mut self,
        auth: &ClientAuth,
        req: &RequestParts<'_>,
    ) -> Result<HttpClientResponse, ClientError> {
        let mut io_retry: usize = 1;
        let mut auth_retry: usize = 1;

        if self.auth.is_none() {
            self.auth = auth.initial(&self.destination)?;
        }

        loop {
            let head = self.request_head(req)?;
            let rsp = match self.exchange(&head, req.body) {
                Ok(rsp) => rsp,
                Err(e) => {
                    self.disconnect();
                    if e.is_retryable() && io_retry > 0 {
                        io_retry -= 1;
                        log::info!(
                            "connection {} to {}: {e}, retry on a new socket",
                            self.id,
                            self.destination
                        );
                        continue;
                    }
                    return Err(e);
                }
            };

            match rsp.code {
                401 => {
                    if auth_retry == 0 {
                        self.disconnect();
                        return Err(ClientError::AuthRetriesExhausted);
                    }
                    auth_retry -= 1;
                    let info = match auth.on_challenge(&self.destination, &rsp.headers) {
                        Ok(info) => info,
                        Err(e) => {
                            self.disconnect();
                            return Err(e);
                        }
                    };
                    let keep_alive = lock_info(&info).keep_alive_on_challenge();
                    self.auth = Some(info);
                    self.skip_body(&rsp, req.method);
                    if !keep_alive {
                        self.disconnect();
                    }
                    log::info!(
                        "connection {} to {}: retry with new credentials",
                        self.id,
                        self.destination
                    );
                }
                407 => {
                    self.disconnect();
                    let challenge = rsp.header(PROXY_AUTHENTICATE).unwrap_or_default();
                    return Err(ClientError::ProxyAuthenticationRequired(challenge.to_string()));
                }
                200..=299 => {
                    if let Some(info) = &self.auth {
                        let r = lock_info(info).verify_response(
                            rsp.header(AUTHENTICATION_INFO),
                            self.auth_digest.as_ref(),
                        );
                        if let Err(e) = r {
                            self.disconnect();
                            return Err(e.into());
                        }
                    }
                    return Ok(rsp);
                }
                _ => return Ok(rsp),
            }
        }
    }
}

impl Read for HttpConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut()?.read(buf)
    }
}

impl BufRead for HttpConnection {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.stream_mut()?.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if let Some(stream) = self.stream.as_mut() {
            stream.consume(amt);
        }
    }
}
