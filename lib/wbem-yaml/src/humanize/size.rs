/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use humanize_rs::bytes::Bytes;
use yaml_rust::Yaml;

/// Parse sizes like `64KiB`, `16MB` or a plain integer
pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => {
            let bytes = s
                .parse::<Bytes>()
                .map_err(|e| anyhow!("invalid humanize size {s}: {e}"))?;
            Ok(bytes.size())
        }
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for humanize size should be 'string' or 'integer'"
        )),
    }
}
