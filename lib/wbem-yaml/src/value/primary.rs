/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

pub fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    match v {
        Yaml::String(s) => Ok(u16::from_str(s)?),
        Yaml::Integer(i) => Ok(u16::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u16' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean', 'string' or 'integer'"
        )),
    }
}

pub fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for string should be 'string', 'integer' or 'real'"
        )),
    }
}

/// A single value is accepted as a list of one element
pub fn as_list<T, F>(v: &Yaml, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Yaml) -> anyhow::Result<T>,
{
    match v {
        Yaml::Array(seq) => {
            let mut vec = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                let node = convert(v).context(format!("invalid value for list element #{i}"))?;
                vec.push(node);
            }
            Ok(vec)
        }
        _ => {
            let node = convert(v).context("invalid single value for the list")?;
            Ok(vec![node])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(as_u16(&Yaml::Integer(5988)).unwrap(), 5988);
        assert_eq!(as_u16(&Yaml::String("5989".to_string())).unwrap(), 5989);
        assert!(as_u16(&Yaml::Integer(65536)).is_err());
        assert!(as_u16(&Yaml::Integer(-1)).is_err());

        assert_eq!(as_usize(&Yaml::Integer(16)).unwrap(), 16);
        assert!(as_usize(&Yaml::Real("1.0".to_string())).is_err());
    }

    #[test]
    fn bools() {
        assert!(as_bool(&Yaml::Boolean(true)).unwrap());
        assert!(as_bool(&Yaml::String("On".to_string())).unwrap());
        assert!(!as_bool(&Yaml::String("no".to_string())).unwrap());
        assert!(!as_bool(&Yaml::Integer(0)).unwrap());
        assert!(as_bool(&Yaml::String("maybe".to_string())).is_err());
        assert!(as_bool(&Yaml::Null).is_err());
    }

    #[test]
    fn lists() {
        let v = Yaml::Array(vec![
            Yaml::String("a".to_string()),
            Yaml::String("b".to_string()),
        ]);
        assert_eq!(as_list(&v, as_string).unwrap(), vec!["a", "b"]);

        let v = Yaml::String("single".to_string());
        assert_eq!(as_list(&v, as_string).unwrap(), vec!["single"]);

        let v = Yaml::Array(vec![Yaml::String("a".to_string()), Yaml::Null]);
        assert!(as_list(&v, as_string).is_err());
    }
}
