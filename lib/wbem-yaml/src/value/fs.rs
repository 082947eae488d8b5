/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use yaml_rust::Yaml;

/// Relative paths are resolved against `lookup_dir`, which should be the
/// directory of the config file.
pub fn as_file_path(v: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let Yaml::String(s) = v else {
        return Err(anyhow!("yaml value type for path should be string"));
    };
    if s.is_empty() {
        return Err(anyhow!("empty path"));
    }
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    match lookup_dir {
        Some(dir) => Ok(dir.join(path)),
        None => Err(anyhow!(
            "relative path {} is not allowed here",
            path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        let v = Yaml::String("/etc/wbem/ca.pem".to_string());
        assert_eq!(
            as_file_path(&v, None).unwrap(),
            PathBuf::from("/etc/wbem/ca.pem")
        );

        let v = Yaml::String("ca.pem".to_string());
        assert!(as_file_path(&v, None).is_err());
        assert_eq!(
            as_file_path(&v, Some(Path::new("/etc/wbem"))).unwrap(),
            PathBuf::from("/etc/wbem/ca.pem")
        );

        assert!(as_file_path(&Yaml::String(String::new()), None).is_err());
        assert!(as_file_path(&Yaml::Integer(1), None).is_err());
    }
}
