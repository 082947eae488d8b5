/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

pub fn parse_content_length(value: &str) -> Option<u64> {
    u64::from_str(value.trim()).ok()
}
