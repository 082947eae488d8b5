/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod destination;
mod pool;
mod tls;

pub use destination::{Destination, DestinationParseError, HttpScheme};
pub use pool::ConnectionPoolConfig;
pub use tls::*;
