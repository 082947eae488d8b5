/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

use wbem_auth::AuthModule;
use wbem_types::auth::{Password, Username};

pub fn as_username(value: &Yaml) -> anyhow::Result<Username> {
    if let Yaml::String(s) = value {
        Username::from_original(s)
    } else {
        Err(anyhow!("yaml value type for username should be string"))
    }
}

pub fn as_password(value: &Yaml) -> anyhow::Result<Password> {
    match value {
        Yaml::String(s) => Password::from_original(s),
        Yaml::Integer(i) => Password::from_original(&i.to_string()),
        _ => Err(anyhow!("yaml value type for password should be string")),
    }
}

pub fn as_auth_module(value: &Yaml) -> anyhow::Result<AuthModule> {
    if let Yaml::String(s) = value {
        AuthModule::from_str(s).map_err(|e| anyhow!("invalid auth module: {e}"))
    } else {
        Err(anyhow!("yaml value type for auth module should be string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username() {
        let v = Yaml::String("admin".to_string());
        assert_eq!(as_username(&v).unwrap().as_original(), "admin");

        let v = Yaml::String("ad:min".to_string());
        assert!(as_username(&v).is_err());
        assert!(as_username(&Yaml::Integer(1)).is_err());
    }

    #[test]
    fn password() {
        let v = Yaml::Integer(123456);
        assert_eq!(as_password(&v).unwrap().as_original(), "123456");
        assert!(as_password(&Yaml::Null).is_err());
    }

    #[test]
    fn auth_module() {
        let v = Yaml::String("Digest".to_string());
        assert_eq!(as_auth_module(&v).unwrap(), AuthModule::Digest);

        let v = Yaml::String("pegasus".to_string());
        assert_eq!(as_auth_module(&v).unwrap(), AuthModule::Local);

        let v = Yaml::String("kerberos".to_string());
        assert_eq!(
            as_auth_module(&v).unwrap(),
            AuthModule::Custom("kerberos".to_string())
        );

        assert!(as_auth_module(&Yaml::String(String::new())).is_err());
    }
}
