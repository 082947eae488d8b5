/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use wbem_auth::{AuthInfoFactory, AuthModule};
use wbem_types::auth::{Password, Username};
use wbem_types::net::{ConnectionPoolConfig, RustlsClientConfigBuilder};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_HEADER_SIZE: usize = 64 * 1024;
const DEFAULT_USER_AGENT: &str = concat!("wbem-client/", env!("CARGO_PKG_VERSION"));

/// Socket level options used when connecting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocketConfig {
    pub connect_timeout: Duration,
    /// Zero means no timeout
    pub read_timeout: Duration,
    /// Zero means no timeout
    pub write_timeout: Duration,
}

impl Default for SocketConfig {
    fn default() -> Self {
        SocketConfig {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl SocketConfig {
    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        (!self.read_timeout.is_zero()).then_some(self.read_timeout)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        (!self.write_timeout.is_zero()).then_some(self.write_timeout)
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pool: ConnectionPoolConfig,
    socket: SocketConfig,
    max_header_size: usize,
    tls: Option<RustlsClientConfigBuilder>,
    auth_module: AuthModule,
    username: Option<Username>,
    password: Password,
    user_agent: Option<String>,
    auth_factories: HashMap<String, Arc<dyn AuthInfoFactory>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            pool: ConnectionPoolConfig::default(),
            socket: SocketConfig::default(),
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            tls: None,
            auth_module: AuthModule::default(),
            username: None,
            password: Password::empty(),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            auth_factories: HashMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn check(&self) -> anyhow::Result<()> {
        if self.socket.connect_timeout.is_zero() {
            return Err(anyhow!("connect timeout should not be zero"));
        }
        if self.max_header_size < 1024 {
            return Err(anyhow!("max header size should be at least 1024"));
        }
        if let Some(tls) = &self.tls {
            tls.check()?;
        }
        Ok(())
    }

    #[inline]
    pub fn pool(&self) -> &ConnectionPoolConfig {
        &self.pool
    }

    #[inline]
    pub fn set_pool_max_size(&mut self, max_size: usize) {
        self.pool.set_max_size(max_size);
    }

    #[inline]
    pub fn socket(&self) -> &SocketConfig {
        &self.socket
    }

    #[inline]
    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.socket.connect_timeout = timeout;
    }

    #[inline]
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.socket.read_timeout = timeout;
    }

    #[inline]
    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.socket.write_timeout = timeout;
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
    pub fn tls(&self) -> Option<&RustlsClientConfigBuilder> {
        self.tls.as_ref()
    }

    #[inline]
    pub fn set_tls(&mut self, tls: RustlsClientConfigBuilder) {
        self.tls = Some(tls);
    }

    #[inline]
    pub fn auth_module(&self) -> &AuthModule {
        &self.auth_module
    }

    #[inline]
    pub fn set_auth_module(&mut self, module: AuthModule) {
        self.auth_module = module;
    }

    pub fn set_credentials(&mut self, username: Username, password: Password) {
        self.username = Some(username);
        self.password = password;
    }

    #[inline]
    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    #[inline]
    pub fn password(&self) -> &Password {
        &self.password
    }

    #[inline]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// An empty value disables the User-Agent header
    pub fn set_user_agent(&mut self, user_agent: &str) {
        if user_agent.is_empty() {
            self.user_agent = None;
        } else {
            self.user_agent = Some(user_agent.to_string());
        }
    }

    /// Register the factory used by `AuthModule::Custom(name)`
    pub fn register_auth_factory(&mut self, name: &str, factory: Arc<dyn AuthInfoFactory>) {
        self.auth_factories.insert(name.to_string(), factory);
    }

    pub(crate) fn auth_factory(&self, name: &str) -> Option<Arc<dyn AuthInfoFactory>> {
        self.auth_factories.get(name).cloned()
    }
}
