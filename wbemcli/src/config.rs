/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use wbem_client::ClientConfig;
use wbem_listener::ListenerConfig;

#[derive(Default)]
pub(crate) struct CliConfig {
    pub(crate) client: ClientConfig,
    pub(crate) listener: ListenerConfig,
}

impl CliConfig {
    /// Load the `client` and `listener` sections, all docs in the file are merged
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let lookup_dir = path.parent();
        let mut config = CliConfig::default();
        wbem_yaml::foreach_doc(path, |_, doc| match doc {
            Yaml::Hash(map) => config.load_doc(map, lookup_dir),
            Yaml::Null => Ok(()),
            _ => Err(anyhow!("yaml doc root should be hash")),
        })?;
        Ok(config)
    }

    fn load_doc(&mut self, map: &yaml::Hash, lookup_dir: Option<&Path>) -> anyhow::Result<()> {
        wbem_yaml::foreach_kv(map, |k, v| match wbem_yaml::key::normalize(k).as_str() {
            "client" => {
                self.client = ClientConfig::parse_yaml(v, lookup_dir)
                    .context("invalid client config")?;
                Ok(())
            }
            "listener" | "server" => {
                self.listener = ListenerConfig::parse_yaml(v, lookup_dir)
                    .context("invalid listener config")?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k} in main conf")),
        })
    }
}
