/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

use wbem_types::net::ConnectionPoolConfig;

pub fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    if let Yaml::String(s) = v {
        SocketAddr::from_str(s).map_err(|e| anyhow!("invalid socket address {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for socket address should be string"))
    }
}

/// Either a map or the max size as a single integer
pub fn as_connection_pool_config(v: &Yaml) -> anyhow::Result<ConnectionPoolConfig> {
    match v {
        Yaml::Hash(map) => {
            let mut config = ConnectionPoolConfig::default();
            crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
                "max_size" | "max_idle" | "max_idle_count" => {
                    config.set_max_size(crate::value::as_usize(v)?);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        }
        Yaml::Integer(_) | Yaml::String(_) => {
            let max_size = crate::value::as_usize(v)?;
            Ok(ConnectionPoolConfig::new(max_size))
        }
        _ => Err(anyhow!(
            "yaml value type for 'connection pool config' should be 'map' or 'integer'"
        )),
    }
}
