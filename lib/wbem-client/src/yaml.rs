/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use wbem_types::auth::Password;
use wbem_types::net::RustlsClientConfigBuilder;

use crate::ClientConfig;

impl ClientConfig {
    pub fn parse_yaml(value: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!("yaml value type for 'client config' should be 'map'"));
        };

        let mut config = ClientConfig::default();
        let mut username = None;
        let mut password = None;
        wbem_yaml::foreach_kv(map, |k, v| match wbem_yaml::key::normalize(k).as_str() {
            "pool" | "connection_pool" => {
                let pool = wbem_yaml::value::as_connection_pool_config(v)?;
                config.set_pool_max_size(pool.max_size());
                Ok(())
            }
            "connect_timeout" => {
                let timeout = wbem_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                config.set_connect_timeout(timeout);
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
            "tls" | "tls_client" => {
                if let Yaml::Boolean(enable) = v {
                    if *enable {
                        config.set_tls(RustlsClientConfigBuilder::default());
                    }
                } else {
                    let builder = wbem_yaml::value::as_rustls_client_config_builder(v, lookup_dir)
                        .context(format!("invalid rustls client config value for key {k}"))?;
                    config.set_tls(builder);
                }
                Ok(())
            }
            "auth" | "auth_module" => {
                let module = wbem_yaml::value::as_auth_module(v)?;
                config.set_auth_module(module);
                Ok(())
            }
            "username" | "user" => {
                username = Some(wbem_yaml::value::as_username(v)?);
                Ok(())
            }
            "password" => {
                password = Some(wbem_yaml::value::as_password(v)?);
                Ok(())
            }
            "user_agent" => {
                let ua = wbem_yaml::value::as_string(v)?;
                config.set_user_agent(&ua);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        match (username, password) {
            (Some(username), password) => {
                config.set_credentials(username, password.unwrap_or_else(Password::empty));
            }
            (None, Some(_)) => return Err(anyhow!("password is set without a username")),
            (None, None) => {}
        }

        config.check()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wbem_auth::AuthModule;
    use yaml_rust::YamlLoader;

    fn load(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().pop().unwrap()
    }

    #[test]
    fn full() {
        let yaml = load(
            r#"
                pool: 4
                connect-timeout: 5s
                read_timeout: 2m
                write_timeout: 0
                max_header_size: 16KiB
                tls:
                  protocol: TLSv1.3
                  sync_handshake: yes
                auth: local
                username: admin
                password: secret
                user_agent: ""
            "#,
        );
        let config = ClientConfig::parse_yaml(&yaml, None).unwrap();
        assert_eq!(config.pool().max_size(), 4);
        assert_eq!(config.socket().connect_timeout, Duration::from_secs(5));
        assert_eq!(config.socket().read_timeout, Duration::from_secs(120));
        assert!(config.socket().write_timeout.is_zero());
        assert_eq!(config.max_header_size(), 16 * 1024);
        assert!(config.tls().unwrap().sync_handshake());
        assert_eq!(config.auth_module(), &AuthModule::Local);
        assert_eq!(config.username().unwrap().as_original(), "admin");
        assert_eq!(config.password().as_original(), "secret");
        assert!(config.user_agent().is_none());
    }

    #[test]
    fn tls_flag() {
        let config = ClientConfig::parse_yaml(&load("tls: true"), None).unwrap();
        assert!(config.tls().is_some());

        let config = ClientConfig::parse_yaml(&load("tls: false"), None).unwrap();
        assert!(config.tls().is_none());
    }

    #[test]
    fn invalid() {
        assert!(ClientConfig::parse_yaml(&load("retry: 3"), None).is_err());
        assert!(ClientConfig::parse_yaml(&load("password: secret"), None).is_err());
        assert!(ClientConfig::parse_yaml(&load("connect_timeout: 0"), None).is_err());
        assert!(ClientConfig::parse_yaml(&load("max_header_size: 100"), None).is_err());
        assert!(ClientConfig::parse_yaml(&load("- a"), None).is_err());
    }
}
