/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod auth;
mod fs;
mod net;
mod primary;
mod tls;

pub use auth::{as_auth_module, as_password, as_username};
pub use fs::as_file_path;
pub use net::{as_connection_pool_config, as_sockaddr};
pub use primary::{as_bool, as_list, as_string, as_u16, as_usize};
pub use tls::{
    as_keystore_config, as_rustls_client_config_builder, as_rustls_server_config_builder,
    as_tls_protocol, as_tls_provider,
};
