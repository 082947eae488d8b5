/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use wbem_types::net::{ConnectionPoolConfig, Destination};

use crate::socket::SocketCloser;
use crate::{ConnectionState, HttpConnection, SocketConfig, SocketFactory};

/// Creates unconnected connections to one destination
pub struct ConnectionBuilder {
    destination: Destination,
    factory: Arc<dyn SocketFactory>,
    socket_config: SocketConfig,
    max_header_size: usize,
    next_id: AtomicU64,
}

impl ConnectionBuilder {
    pub fn new(
        destination: Destination,
        factory: Arc<dyn SocketFactory>,
        socket_config: SocketConfig,
        max_header_size: usize,
    ) -> Self {
        ConnectionBuilder {
            destination,
            factory,
            socket_config,
            max_header_size,
            next_id: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn build(&self) -> HttpConnection {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        HttpConnection::new(
            id,
            self.destination.clone(),
            self.factory.clone(),
            self.socket_config,
            self.max_header_size,
        )
    }
}

#[derive(Default)]
struct PoolInner {
    /// Every connection owned by the pool, idle or checked out
    all: HashMap<u64, Arc<SocketCloser>>,
    available: Vec<HttpConnection>,
    closed: bool,
}

/// Keeps idle connections for reuse.
///
/// Acquiring never blocks, a new connection is created if none is idle.
pub struct ConnectionPool {
    config: ConnectionPoolConfig,
    builder: ConnectionBuilder,
    inner: Mutex<PoolInner>,
}

impl ConnectionPool {
    pub fn new(config: ConnectionPoolConfig, builder: ConnectionBuilder) -> Self {
        ConnectionPool {
            config,
            builder,
            inner: Mutex::new(PoolInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[inline]
    pub fn destination(&self) -> &Destination {
        self.builder.destination()
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.config.max_size()
    }

    pub fn acquire(&self) -> HttpConnection {
        let mut inner = self.lock();
        if let Some(conn) = inner.available.pop() {
            return conn;
        }
        let conn = self.builder.build();
        if !inner.closed {
            inner.all.insert(conn.id(), conn.closer().clone());
        }
        log::debug!("new connection {} to {}", conn.id(), self.destination());
        conn
    }

    /// Give back a checked out connection.
    ///
    /// It is closed instead if the pool is closed or full, or no longer owns it.
    pub fn release(&self, mut conn: HttpConnection) {
        let mut inner = self.lock();
        if !inner.closed
            && inner.available.len() < self.config.max_size()
            && inner.all.contains_key(&conn.id())
            && conn.state() != ConnectionState::Closed
        {
            inner.available.push(conn);
            return;
        }
        inner.all.remove(&conn.id());
        drop(inner);
        log::debug!("connection {} to {} discarded", conn.id(), self.destination());
        conn.close();
    }

    /// Stop owning the connection without closing it
    pub fn remove(&self, conn: &HttpConnection) {
        self.lock().all.remove(&conn.id());
    }

    /// Remove the connection and close it
    pub fn discard(&self, mut conn: HttpConnection) {
        self.remove(&conn);
        log::debug!("connection {} to {} discarded", conn.id(), self.destination());
        conn.close();
    }

    /// Close idle connections.
    ///
    /// With `keep_idle_only` unset the checked out ones are shut down as
    /// well, and the pool refuses every later release.
    pub fn close(&self, keep_idle_only: bool) {
        let mut inner = self.lock();
        let idle = std::mem::take(&mut inner.available);
        let closers: Vec<Arc<SocketCloser>> = inner.all.drain().map(|(_, c)| c).collect();
        if !keep_idle_only {
            inner.closed = true;
        }
        drop(inner);

        for mut conn in idle {
            conn.close();
        }
        if !keep_idle_only {
            for closer in closers {
                closer.close();
            }
            log::debug!("connection pool to {} closed", self.destination());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn idle_count(&self) -> usize {
        self.lock().available.len()
    }

    /// Number of connections owned, idle or checked out
    pub fn owned_count(&self) -> usize {
        self.lock().all.len()
    }

    #[cfg(test)]
    fn check_invariant(&self) {
        let inner = self.lock();
        assert!(inner.available.len() <= self.config.max_size());
        for conn in &inner.available {
            assert!(inner.all.contains_key(&conn.id()));
        }
    }
}
