/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use wbem_types::net::{
    KeyStoreConfig, KeyStoreType, RustlsClientConfigBuilder, RustlsServerConfigBuilder,
    TlsProtocol, TlsProvider,
};

pub fn as_tls_protocol(v: &Yaml) -> anyhow::Result<TlsProtocol> {
    match v {
        Yaml::String(s) => TlsProtocol::from_str(s),
        Yaml::Real(s) => TlsProtocol::from_str(s),
        _ => Err(anyhow!(
            "yaml value type for tls protocol should be 'string' or 'real'"
        )),
    }
}

pub fn as_tls_provider(v: &Yaml) -> anyhow::Result<TlsProvider> {
    if let Yaml::String(s) = v {
        TlsProvider::from_str(s)
    } else {
        Err(anyhow!("yaml value type for tls provider should be string"))
    }
}

fn as_cipher_suites(v: &Yaml) -> anyhow::Result<Vec<String>> {
    match v {
        Yaml::String(s) => Ok(s
            .split(':')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Yaml::Array(_) => crate::value::as_list(v, crate::value::as_string),
        _ => Err(anyhow!(
            "yaml value type for cipher suites should be 'string' or 'array'"
        )),
    }
}

/// A path to a PEM file, or a map with `path`, `password` and `type`
pub fn as_keystore_config(v: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<KeyStoreConfig> {
    match v {
        Yaml::String(_) => {
            let path = crate::value::as_file_path(v, lookup_dir)?;
            Ok(KeyStoreConfig::new(path))
        }
        Yaml::Hash(map) => {
            let mut config = KeyStoreConfig::default();
            crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
                "path" | "file" => {
                    let path = crate::value::as_file_path(v, lookup_dir)?;
                    config.set_path(path);
                    Ok(())
                }
                "password" => {
                    let password = crate::value::as_string(v)?;
                    config.set_password(password);
                    Ok(())
                }
                "type" | "store_type" => {
                    let s = crate::value::as_string(v)?;
                    config.set_store_type(KeyStoreType::from_str(&s)?);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            config.check()?;
            Ok(config)
        }
        _ => Err(anyhow!(
            "yaml value type for keystore should be 'string' or 'map'"
        )),
    }
}

fn as_truststore(v: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    crate::value::as_file_path(v, lookup_dir).context("invalid truststore path")
}

pub fn as_rustls_client_config_builder(
    v: &Yaml,
    lookup_dir: Option<&Path>,
) -> anyhow::Result<RustlsClientConfigBuilder> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!(
            "yaml value type for 'rustls client config' should be 'map'"
        ));
    };

    let mut builder = RustlsClientConfigBuilder::default();
    crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
        "provider" => {
            builder.set_provider(as_tls_provider(v)?);
            Ok(())
        }
        "protocol" => {
            builder.set_protocol(as_tls_protocol(v)?);
            Ok(())
        }
        "cipher_suites" | "ciphers" => {
            builder.set_cipher_suites(as_cipher_suites(v)?);
            Ok(())
        }
        "truststore" | "ca_certificate" => {
            builder.set_truststore(as_truststore(v, lookup_dir)?);
            Ok(())
        }
        "keystore" | "certificate" => {
            builder.set_keystore(as_keystore_config(v, lookup_dir)?);
            Ok(())
        }
        "handshake_timeout" => {
            let timeout = crate::humanize::as_duration(v)
                .context(format!("invalid humanize duration value for key {k}"))?;
            builder.set_handshake_timeout(timeout);
            Ok(())
        }
        "sync_handshake" | "synchronized_handshake" => {
            builder.set_sync_handshake(crate::value::as_bool(v)?);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    builder.check()?;
    Ok(builder)
}

pub fn as_rustls_server_config_builder(
    v: &Yaml,
    lookup_dir: Option<&Path>,
) -> anyhow::Result<RustlsServerConfigBuilder> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!(
            "yaml value type for 'rustls server config' should be 'map'"
        ));
    };

    let mut builder = RustlsServerConfigBuilder::default();
    crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
        "provider" => {
            builder.set_provider(as_tls_provider(v)?);
            Ok(())
        }
        "protocol" => {
            builder.set_protocol(as_tls_protocol(v)?);
            Ok(())
        }
        "cipher_suites" | "ciphers" => {
            builder.set_cipher_suites(as_cipher_suites(v)?);
            Ok(())
        }
        "keystore" | "certificate" => {
            builder.set_keystore(as_keystore_config(v, lookup_dir)?);
            Ok(())
        }
        "client_auth" => {
            if crate::value::as_bool(v)? {
                builder.enable_client_auth();
            }
            Ok(())
        }
        "client_auth_truststore" => {
            builder.set_client_auth_truststore(as_truststore(v, lookup_dir)?);
            Ok(())
        }
        "accept_timeout" | "handshake_timeout" => {
            let timeout = crate::humanize::as_duration(v)
                .context(format!("invalid humanize duration value for key {k}"))?;
            builder.set_accept_timeout(timeout);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    builder.check()?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use yaml_rust::YamlLoader;

    #[test]
    fn protocol() {
        let v = Yaml::String("TLSv1.3".to_string());
        assert_eq!(as_tls_protocol(&v).unwrap(), TlsProtocol::Tls13);

        let v = Yaml::Real("1.2".to_string());
        assert_eq!(as_tls_protocol(&v).unwrap(), TlsProtocol::Tls12);

        assert!(as_tls_protocol(&Yaml::Integer(1)).is_err());
    }

    #[test]
    fn keystore() {
        let yaml = yaml_doc!("server.pem");
        let config = as_keystore_config(&yaml, Some(Path::new("/etc/wbem"))).unwrap();
        assert_eq!(config.path(), Path::new("/etc/wbem/server.pem"));
        assert_eq!(config.password(), None);

        let yaml = yaml_doc!(
            r#"
                path: /etc/wbem/server.pem
                password: secret
                type: PEM
            "#
        );
        let config = as_keystore_config(&yaml, None).unwrap();
        assert_eq!(config.password(), Some("secret"));
        assert_eq!(config.store_type(), KeyStoreType::Pem);

        let yaml = yaml_doc!("path: /a.p12\ntype: PKCS12");
        assert!(as_keystore_config(&yaml, None).is_err());

        let yaml = yaml_doc!("password: secret");
        assert!(as_keystore_config(&yaml, None).is_err());
    }

    #[test]
    fn client_builder() {
        let yaml = yaml_doc!(
            r#"
                protocol: TLSv1.2
                cipher-suites: "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256:TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384"
                handshake_timeout: 3s
                sync_handshake: true
            "#
        );
        let builder = as_rustls_client_config_builder(&yaml, None).unwrap();
        assert_eq!(builder.protocol(), TlsProtocol::Tls12);
        assert_eq!(builder.cipher_suites().len(), 2);
        assert!(builder.sync_handshake());
        let config = builder.build().unwrap();
        assert_eq!(config.handshake_timeout, Duration::from_secs(3));

        let yaml = yaml_doc!("handshake_timeout: 0");
        assert!(as_rustls_client_config_builder(&yaml, None).is_err());

        let yaml = yaml_doc!("verify_hostname: false");
        assert!(as_rustls_client_config_builder(&yaml, None).is_err());
    }

    #[test]
    fn server_builder() {
        let yaml = yaml_doc!(
            r#"
                keystore: /etc/wbem/server.pem
                client_auth: true
                accept_timeout: 5s
            "#
        );
        let builder = as_rustls_server_config_builder(&yaml, None).unwrap();
        assert!(builder.check().is_ok());

        let yaml = yaml_doc!("protocol: TLS");
        assert!(as_rustls_server_config_builder(&yaml, None).is_err());
    }
}
