/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rustls::{ClientConnection, StreamOwned};
use rustls_pki_types::ServerName;

use wbem_types::net::{Destination, RustlsClientConfig};

use crate::{ClientError, SocketConfig};

/// A connected byte stream, plain or encrypted
pub trait SocketStream: Read + Write + Send {}

impl<T: Read + Write + Send> SocketStream for T {}

pub struct ConnectedSocket {
    pub stream: Box<dyn SocketStream>,
    /// A handle on the underlying tcp socket, used to shut it down from another thread
    pub tcp: Option<TcpStream>,
}

impl ConnectedSocket {
    pub fn new(stream: Box<dyn SocketStream>, tcp: Option<TcpStream>) -> Self {
        ConnectedSocket { stream, tcp }
    }
}

/// Opens the socket for a destination
pub trait SocketFactory: Send + Sync {
    fn connect(
        &self,
        destination: &Destination,
        config: &SocketConfig,
    ) -> Result<ConnectedSocket, ClientError>;
}

/// Some TLS providers can not run handshakes in parallel.
static HANDSHAKE_LOCK: Mutex<()> = Mutex::new(());

/// Plain TCP for `http`, rustls for `https`
#[derive(Clone, Default)]
pub struct DefaultSocketFactory {
    tls: Option<RustlsClientConfig>,
}

impl DefaultSocketFactory {
    pub fn new(tls: Option<RustlsClientConfig>) -> Self {
        DefaultSocketFactory { tls }
    }

    fn tcp_connect(
        &self,
        destination: &Destination,
        config: &SocketConfig,
    ) -> Result<TcpStream, ClientError> {
        let addrs: Vec<SocketAddr> = (destination.host(), destination.port())
            .to_socket_addrs()
            .map_err(ClientError::ConnectFailed)?
            .collect();
        if addrs.is_empty() {
            return Err(ClientError::ConnectFailed(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address resolved for {}", destination.host()),
            )));
        }

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, config.connect_timeout) {
                Ok(stream) => {
                    log::debug!("connected to {destination} via {addr}");
                    stream
                        .set_read_timeout(config.read_timeout())
                        .map_err(ClientError::ConnectFailed)?;
                    stream
                        .set_write_timeout(config.write_timeout())
                        .map_err(ClientError::ConnectFailed)?;
                    stream.set_nodelay(true).map_err(ClientError::ConnectFailed)?;
                    return Ok(stream);
                }
                Err(e) => {
                    log::debug!("failed to connect to {addr}: {e}");
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) => Err(ClientError::from_connect(e)),
            None => Err(ClientError::ConnectFailed(io::Error::other("no address to connect"))),
        }
    }

    fn tls_handshake(
        &self,
        tls: &RustlsClientConfig,
        destination: &Destination,
        tcp: TcpStream,
        config: &SocketConfig,
    ) -> Result<StreamOwned<ClientConnection, TcpStream>, ClientError> {
        let server_name = ServerName::try_from(destination.host().to_string())
            .map_err(|_| ClientError::InvalidTlsServerName(destination.host().to_string()))?;
        let conn = ClientConnection::new(tls.driver.clone(), server_name)
            .map_err(|e| ClientError::TlsHandshakeFailed(io::Error::other(e)))?;
        let mut stream = StreamOwned::new(conn, tcp);

        let _guard = if tls.sync_handshake {
            Some(HANDSHAKE_LOCK.lock().unwrap_or_else(|e| e.into_inner()))
        } else {
            None
        };

        let deadline = Instant::now() + tls.handshake_timeout;
        while stream.conn.is_handshaking() {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(ClientError::Timeout(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "tls handshake timed out",
                )));
            }
            stream
                .sock
                .set_read_timeout(Some(left))
                .map_err(ClientError::TlsHandshakeFailed)?;
            if let Err(e) = stream.conn.complete_io(&mut stream.sock) {
                return Err(match e.kind() {
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ClientError::Timeout(e),
                    _ => ClientError::TlsHandshakeFailed(e),
                });
            }
        }
        stream
            .sock
            .set_read_timeout(config.read_timeout())
            .map_err(ClientError::TlsHandshakeFailed)?;
        log::debug!(
            "tls handshake with {destination} done, protocol {:?}",
            stream.conn.protocol_version()
        );
        Ok(stream)
    }
}

impl SocketFactory for DefaultSocketFactory {
    fn connect(
        &self,
        destination: &Destination,
        config: &SocketConfig,
    ) -> Result<ConnectedSocket, ClientError> {
        let tcp = self.tcp_connect(destination, config)?;
        let handle = tcp.try_clone().ok();

        if !destination.scheme().is_tls() {
            return Ok(ConnectedSocket::new(Box::new(tcp), handle));
        }
        let Some(tls) = &self.tls else {
            return Err(ClientError::InvalidConfig(anyhow::anyhow!(
                "no tls client config for {destination}"
            )));
        };
        let stream = self.tls_handshake(tls, destination, tcp, config)?;
        Ok(ConnectedSocket::new(Box::new(stream), handle))
    }
}

/// Shuts down the tcp socket of a connection from any thread
#[derive(Default)]
pub(crate) struct SocketCloser {
    tcp: Mutex<Option<TcpStream>>,
    closed: AtomicBool,
}

impl SocketCloser {
    pub(crate) fn set(&self, tcp: Option<TcpStream>) {
        *self.tcp.lock().unwrap_or_else(|e| e.into_inner()) = tcp;
    }

    /// Unblock any pending read or write, which will fail with an io error
    pub(crate) fn shutdown(&self) {
        if let Some(tcp) = self.tcp.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = tcp.shutdown(Shutdown::Both);
        }
    }

    /// Shut down the socket and refuse any later reconnect
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.shutdown();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use wbem_types::net::HttpScheme;

    #[test]
    fn plain_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            s.read_exact(&mut buf).unwrap();
            s.write_all(&buf).unwrap();
        });

        let factory = DefaultSocketFactory::default();
        let dest = Destination::new(HttpScheme::Http, "127.0.0.1", port);
        let mut socket = factory.connect(&dest, &SocketConfig::default()).unwrap();
        assert!(socket.tcp.is_some());
        socket.stream.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        socket.stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
        server.join().unwrap();
    }

    #[test]
    fn refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let factory = DefaultSocketFactory::default();
        let dest = Destination::new(HttpScheme::Http, "127.0.0.1", port);
        let err = factory.connect(&dest, &SocketConfig::default()).err().unwrap();
        assert!(err.is_retryable());
    }

    #[test]
    fn https_without_tls_config() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let factory = DefaultSocketFactory::default();
        let dest = Destination::new(HttpScheme::Https, "127.0.0.1", port);
        let err = factory.connect(&dest, &SocketConfig::default()).err().unwrap();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
        drop(listener);
    }
}
