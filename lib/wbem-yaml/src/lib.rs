/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[cfg(test)]
#[macro_use]
mod macros;

mod hash;
mod util;

pub mod humanize;
pub mod key;
pub mod value;

pub use hash::{
    foreach_kv, get_required as hash_get_required, get_required_str as hash_get_required_str,
};
pub use util::{foreach_doc, load_docs};
