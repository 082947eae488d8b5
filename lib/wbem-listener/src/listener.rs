/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::serve::ServeContext;
use crate::worker::{Job, WorkerPool};
use crate::{ContentHandler, ListenerConfig, ListenerError, WorkerPoolStats};

/// An HTTP listener for inbound CIM-XML requests, such as indications
pub struct WbemListener {
    config: ListenerConfig,
}

impl WbemListener {
    pub fn new(config: ListenerConfig) -> Self {
        WbemListener { config }
    }

    /// Bind and start accepting in a new thread
    pub fn start(&self, handler: Arc<dyn ContentHandler>) -> Result<ListenerHandle, ListenerError> {
        self.config.check().map_err(ListenerError::InvalidConfig)?;
        let tls = match self.config.tls() {
            Some(builder) => Some(builder.build().map_err(ListenerError::InvalidConfig)?),
            None => None,
        };

        let bind = self.config.bind();
        let listener = TcpListener::bind(bind).map_err(|e| ListenerError::BindFailed(bind, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ListenerError::BindFailed(bind, e))?;

        let context = ServeContext::new(&self.config, tls, handler);
        let pool = Arc::new(WorkerPool::new(
            self.config.min_workers(),
            self.config.max_workers(),
            self.config.worker_idle_timeout(),
            self.config.queue_capacity(),
            context,
        )?);
        let stopping = Arc::new(AtomicBool::new(false));

        let accept_thread = {
            let pool = pool.clone();
            let stopping = stopping.clone();
            std::thread::Builder::new()
                .name("wbem-accept".to_string())
                .spawn(move || accept_loop(listener, &pool, &stopping))
                .map_err(ListenerError::SpawnFailed)?
        };
        log::info!(
            "listening on {local_addr}{}",
            if self.config.tls().is_some() {
                " with tls"
            } else {
                ""
            }
        );

        Ok(ListenerHandle {
            local_addr,
            stopping,
            pool,
            accept_thread: Some(accept_thread),
            grace: self.config.shutdown_grace(),
        })
    }
}

/// Start a plain listener on `port` with the default settings
pub fn listen(port: u16, handler: Arc<dyn ContentHandler>) -> Result<ListenerHandle, ListenerError> {
    WbemListener::new(ListenerConfig::with_port(port)).start(handler)
}

fn accept_loop(listener: TcpListener, pool: &WorkerPool, stopping: &AtomicBool) {
    let is_stopping = || stopping.load(Ordering::Acquire);
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                if is_stopping() {
                    break;
                }
                pool.dispatch(Job { stream, peer }, is_stopping);
            }
            Err(e) => {
                if is_stopping() {
                    break;
                }
                log::warn!("accept failed: {e}");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

pub struct ListenerHandle {
    local_addr: SocketAddr,
    stopping: Arc<AtomicBool>,
    pool: Arc<WorkerPool>,
    accept_thread: Option<JoinHandle<()>>,
    grace: Duration,
}

impl ListenerHandle {
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> WorkerPoolStats {
        self.pool.stats()
    }

    fn wakeup_addr(&self) -> SocketAddr {
        let ip = match self.local_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        SocketAddr::new(ip, self.local_addr.port())
    }

    fn stop(&mut self) -> bool {
        let Some(accept_thread) = self.accept_thread.take() else {
            return true;
        };
        self.stopping.store(true, Ordering::Release);
        // unblock the accept call
        let _ = TcpStream::connect_timeout(&self.wakeup_addr(), Duration::from_secs(1));
        let _ = accept_thread.join();

        let clean = self.pool.shutdown(self.grace);
        log::info!("listener on {} stopped", self.local_addr);
        clean
    }

    /// Stop accepting, then wait for in flight requests up to the grace period.
    ///
    /// Return false if some connections had to be closed.
    pub fn shutdown(mut self) -> bool {
        self.stop()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
