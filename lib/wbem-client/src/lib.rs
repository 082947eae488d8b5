/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::ClientError;

mod config;
pub use config::{ClientConfig, SocketConfig};

#[cfg(feature = "yaml")]
mod yaml;

mod socket;
pub use socket::{ConnectedSocket, DefaultSocketFactory, SocketFactory, SocketStream};

mod connection;
pub use connection::{ConnectionState, HttpConnection, RequestParts};

mod pool;
pub use pool::{ConnectionBuilder, ConnectionPool};

mod auth;
pub use auth::ClientAuth;

mod body;
pub use body::ResponseBody;

mod client;
pub use client::{WbemClient, WbemResponse};
