/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod version;
pub use version::TlsProtocol;

mod provider;
pub use provider::TlsProvider;

mod keystore;
pub use keystore::{KeyStoreConfig, KeyStoreType};

mod client;
pub use client::{RustlsClientConfig, RustlsClientConfigBuilder};

mod server;
pub use server::{RustlsServerConfig, RustlsServerConfigBuilder};
