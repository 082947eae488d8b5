/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

const DEFAULT_POOL_MAX_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionPoolConfig {
    max_size: usize,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        ConnectionPoolConfig::new(DEFAULT_POOL_MAX_SIZE)
    }
}

impl ConnectionPoolConfig {
    pub fn new(max_size: usize) -> Self {
        ConnectionPoolConfig { max_size }
    }

    /// Zero disables reuse, every returned connection is closed.
    #[inline]
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
