/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use crate::ListenerConfig;

fn parse_workers(v: &Yaml, min: &mut usize, max: &mut usize) -> anyhow::Result<()> {
    match v {
        Yaml::Hash(map) => wbem_yaml::foreach_kv(map, |k, v| {
            match wbem_yaml::key::normalize(k).as_str() {
                "min" => *min = wbem_yaml::value::as_usize(v)?,
                "max" => *max = wbem_yaml::value::as_usize(v)?,
                _ => return Err(anyhow!("invalid key {k}")),
            }
            Ok(())
        }),
        _ => {
            *max = wbem_yaml::value::as_usize(v)?;
            Ok(())
        }
    }
}

impl ListenerConfig {
    pub fn parse_yaml(value: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!(
                "yaml value type for 'listener config' should be 'map'"
            ));
        };

        let mut config = ListenerConfig::default();
        let mut min_workers = config.min_workers();
        let mut max_workers = config.max_workers();
        wbem_yaml::foreach_kv(map, |k, v| match wbem_yaml::key::normalize(k).as_str() {
            "bind" | "listen" => {
                let addr = wbem_yaml::value::as_sockaddr(v)?;
                config.set_bind(addr);
                Ok(())
            }
            "port" => {
                let port = wbem_yaml::value::as_u16(v)?;
                config.set_port(port);
                Ok(())
            }
            "tls" | "tls_server" => {
                let builder = wbem_yaml::value::as_rustls_server_config_builder(v, lookup_dir)
                    .context(format!("invalid rustls server config value for key {k}"))?;
                config.set_tls(builder);
                Ok(())
            }
            "workers" => parse_workers(v, &mut min_workers, &mut max_workers),
            "min_workers" => {
                min_workers = wbem_yaml::value::as_usize(v)?;
                Ok(())
            }
            "max_workers" => {
                max_workers = wbem_yaml::value::as_usize(v)?;
                Ok(())
            }
            "worker_idle_timeout" => {
                let timeout = wbem_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                config.set_worker_idle_timeout(timeout);
                Ok(())
            }
            "queue_capacity" | "queue_size" => {
                let capacity = wbem_yaml::value::as_usize(v)?;
                config.set_queue_capacity(capacity);
                Ok(())
            }
            "shutdown_grace" | "shutdown_timeout" => {
                let timeout = wbem_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                config.set_shutdown_grace(timeout);
                Ok(())
            }
            "read_timeout" => {
                let timeout = wbem_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                config.set_read_timeout(timeout);
                Ok(())
            }
            "write_timeout" => {
                let timeout = wbem_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                config.set_write_timeout(timeout);
                Ok(())
            }
            "max_header_size" => {
                let size = wbem_yaml::humanize::as_usize(v)
                    .context(format!("invalid humanize usize value for key {k}"))?;
                config.set_max_header_size(size);
                Ok(())
            }
            "max_body_size" => {
                let size = wbem_yaml::humanize::as_usize(v)
                    .context(format!("invalid humanize usize value for key {k}"))?;
                config.set_max_body_size(size);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        config.set_workers(min_workers, max_workers);

        config.check()?;
        Ok(config)
    }
}
