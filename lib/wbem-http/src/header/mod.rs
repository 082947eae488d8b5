/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod bag;
pub use bag::{HeaderBag, HttpHeaderReadError};

mod auth;
pub use auth::*;

mod connection;
pub use connection::Connection;

mod content;
pub use content::parse_content_length;

mod transfer;
pub use transfer::{is_chunked_transfer, te_accepts_chunked};
