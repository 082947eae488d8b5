/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use http::{Method, Version};
use url::Url;

use wbem_auth::{AuthModule, AuthorizationRegistry};
use wbem_http::HeaderBag;
use wbem_types::net::{Destination, RustlsClientConfigBuilder};

use crate::{
    ClientAuth, ClientConfig, ClientError, ConnectionBuilder, ConnectionPool, DefaultSocketFactory,
    RequestParts, ResponseBody, SocketFactory,
};

const DEFAULT_PATH: &str = "/cimom";

pub struct WbemResponse {
    pub version: Version,
    pub code: u16,
    pub reason: String,
    pub headers: HeaderBag,
    pub body: ResponseBody,
}

impl WbemResponse {
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Sends CIM-XML requests to one management agent
pub struct WbemClient {
    destination: Destination,
    path: String,
    pool: Arc<ConnectionPool>,
    auth: ClientAuth,
    user_agent: Option<String>,
    max_header_size: usize,
}

fn parse_url(url: &str) -> Result<(Destination, String), ClientError> {
    let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{url}: {e}")))?;
    let destination =
        Destination::from_url(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    let mut path = match url.path() {
        "" | "/" => DEFAULT_PATH.to_string(),
        p => p.to_string(),
    };
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    Ok((destination, path))
}

impl WbemClient {
    /// Create a client for `url`, `http://host:5988/cimom` for example.
    ///
    /// The path defaults to `/cimom`.
    pub fn new(url: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        let (destination, path) = parse_url(url)?;
        config.check().map_err(ClientError::InvalidConfig)?;

        let tls = match config.tls() {
            Some(builder) => Some(builder.build().map_err(ClientError::InvalidConfig)?),
            None if destination.scheme().is_tls() => Some(
                RustlsClientConfigBuilder::default()
                    .build()
                    .map_err(ClientError::InvalidConfig)?,
            ),
            None => None,
        };
        let factory = Arc::new(DefaultSocketFactory::new(tls));
        Self::build(destination, path, config, factory)
    }

    /// Create a client that opens its sockets through `factory`
    pub fn with_socket_factory(
        url: &str,
        config: &ClientConfig,
        factory: Arc<dyn SocketFactory>,
    ) -> Result<Self, ClientError> {
        let (destination, path) = parse_url(url)?;
        config.check().map_err(ClientError::InvalidConfig)?;
        Self::build(destination, path, config, factory)
    }

    fn build(
        destination: Destination,
        path: String,
        config: &ClientConfig,
        factory: Arc<dyn SocketFactory>,
    ) -> Result<Self, ClientError> {
        let builder = ConnectionBuilder::new(
            destination.clone(),
            factory,
            *config.socket(),
            config.max_header_size(),
        );
        let pool = ConnectionPool::new(*config.pool(), builder);

        let mut auth = ClientAuth::new(
            config.auth_module().clone(),
            config.username().cloned(),
            config.password().clone(),
            Arc::new(AuthorizationRegistry::new()),
        );
        if let AuthModule::Custom(name) = config.auth_module() {
            match config.auth_factory(name) {
                Some(factory) => auth.set_factory(factory),
                None => {
                    return Err(ClientError::InvalidConfig(anyhow::anyhow!(
                        "no factory registered for auth module {name}"
                    )));
                }
            }
        }

        Ok(WbemClient {
            destination,
            path,
            pool: Arc::new(pool),
            auth,
            user_agent: config.user_agent().map(|s| s.to_string()),
            max_header_size: config.max_header_size(),
        })
    }

    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    #[inline]
    pub fn auth(&self) -> &ClientAuth {
        &self.auth
    }

    /// Send one CIM-XML request, the method should be `POST` or `M-POST`.
    ///
    /// Host, Content-Length and User-Agent are set by the client.
    pub fn submit(
        &self,
        method: &Method,
        headers: &HeaderBag,
        body: &[u8],
    ) -> Result<WbemResponse, ClientError> {
        if !matches!(method.as_str(), "POST" | "M-POST") {
            return Err(ClientError::UnsupportedMethod(method.to_string()));
        }
        if self.pool.is_closed() {
            return Err(ClientError::PoolClosed);
        }

        let mut all_headers = HeaderBag::new();
        all_headers.insert(http::header::HOST.as_str(), &self.destination.host_header());
        if let Some(ua) = &self.user_agent {
            all_headers.insert(http::header::USER_AGENT.as_str(), ua);
        }
        for (name, value) in headers.iter() {
            all_headers.insert(name, value);
        }
        all_headers.insert(
            http::header::CONTENT_LENGTH.as_str(),
            &body.len().to_string(),
        );

        let req = RequestParts {
            method,
            uri: &self.path,
            headers: &all_headers,
            body,
        };
        let mut conn = self.pool.acquire();
        match conn.send(&self.auth, &req) {
            Ok(rsp) => {
                let body_type = rsp.body_type(method);
                let body =
                    ResponseBody::new(conn, body_type, self.max_header_size, self.pool.clone());
                Ok(WbemResponse {
                    version: rsp.version,
                    code: rsp.code,
                    reason: rsp.reason,
                    headers: rsp.headers,
                    body,
                })
            }
            Err(e) => {
                log::debug!("request to {} failed: {e}", self.destination);
                self.pool.discard(conn);
                Err(e)
            }
        }
    }

    /// Close every connection and forget all credentials state
    pub fn close(&self) {
        self.pool.close(false);
        self.auth.registry().clear();
    }
}

impl Drop for WbemClient {
    fn drop(&mut self) {
        self.pool.close(true);
    }
}
