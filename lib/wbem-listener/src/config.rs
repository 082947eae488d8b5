/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::anyhow;

use wbem_types::net::RustlsServerConfigBuilder;

const DEFAULT_PORT: u16 = 5990;

/// Settings of an indication listener
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerConfig {
    bind: SocketAddr,
    tls: Option<RustlsServerConfigBuilder>,
    min_workers: usize,
    max_workers: usize,
    worker_idle_timeout: Duration,
    queue_capacity: usize,
    shutdown_grace: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    max_header_size: usize,
    max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            tls: None,
            min_workers: 1,
            max_workers: 16,
            worker_idle_timeout: Duration::from_secs(60),
            queue_capacity: 1024,
            shutdown_grace: Duration::from_secs(3),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            max_header_size: 64 * 1024,
            max_body_size: 16 * 1024 * 1024,
        }
    }
}

impl ListenerConfig {
    pub fn with_port(port: u16) -> Self {
        let mut config = ListenerConfig::default();
        config.set_port(port);
        config
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.max_workers == 0 {
            return Err(anyhow!("max workers should not be zero"));
        }
        if self.min_workers > self.max_workers {
            return Err(anyhow!(
                "min workers {} is larger than max workers {}",
                self.min_workers,
                self.max_workers
            ));
        }
        if self.queue_capacity == 0 {
            return Err(anyhow!("queue capacity should not be zero"));
        }
        if let Some(tls) = &self.tls {
            tls.check()?;
        }
        Ok(())
    }

    #[inline]
    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    #[inline]
    pub fn set_bind(&mut self, addr: SocketAddr) {
        self.bind = addr;
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) {
        self.bind.set_port(port);
    }

    #[inline]
    pub fn tls(&self) -> Option<&RustlsServerConfigBuilder> {
        self.tls.as_ref()
    }

    #[inline]
    pub fn set_tls(&mut self, tls: RustlsServerConfigBuilder) {
        self.tls = Some(tls);
    }

    #[inline]
    pub fn min_workers(&self) -> usize {
        self.min_workers
    }

    #[inline]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn set_workers(&mut self, min: usize, max: usize) {
        self.min_workers = min;
        self.max_workers = max;
    }

    #[inline]
    pub fn worker_idle_timeout(&self) -> Duration {
        self.worker_idle_timeout
    }

    #[inline]
    pub fn set_worker_idle_timeout(&mut self, timeout: Duration) {
        self.worker_idle_timeout = timeout;
    }

    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    #[inline]
    pub fn set_queue_capacity(&mut self, capacity: usize) {
        self.queue_capacity = capacity;
    }

    #[inline]
    pub fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }

    #[inline]
    pub fn set_shutdown_grace(&mut self, grace: Duration) {
        self.shutdown_grace = grace;
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    #[inline]
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    #[inline]
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    #[inline]
    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = timeout;
    }

    #[inline]
    pub fn max_header_size(&self) -> usize {
        self.max_header_size
    }

    #[inline]
    pub fn set_max_header_size(&mut self, size: usize) {
        self.max_header_size = size;
    }

    #[inline]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    #[inline]
    pub fn set_max_body_size(&mut self, size: usize) {
        self.max_body_size = size;
    }
}
