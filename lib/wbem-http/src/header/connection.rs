/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// The persistence option found in a Connection header value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connection {
    Close,
    KeepAlive,
}

impl Connection {
    /// Scan the comma separated options, `close` wins over `keep-alive`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut found = None;
        for v in value.split(',') {
            let v = v.trim();
            if v.eq_ignore_ascii_case("close") {
                return Some(Connection::Close);
            } else if v.eq_ignore_ascii_case("keep-alive") {
                found = Some(Connection::KeepAlive);
            }
        }
        found
    }
}
