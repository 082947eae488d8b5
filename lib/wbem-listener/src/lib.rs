/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::ListenerConfig;

#[cfg(feature = "yaml")]
mod yaml;

mod error;
pub use error::{HandlerError, ListenerError};

mod handler;
pub use handler::ContentHandler;

mod worker;
pub use worker::WorkerPoolStats;

mod serve;

mod listener;
pub use listener::{ListenerHandle, WbemListener, listen};
