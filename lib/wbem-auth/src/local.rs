/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::PathBuf;

use log::warn;

use wbem_types::auth::Username;

use crate::Challenge;

/// The OpenPegasus local scheme.
///
/// The first request only carries the user name. The server then answers
/// with the path of a token file that only the claimed user can read, and
/// the next request carries the file content.
#[derive(Clone, Debug)]
pub struct LocalAuth {
    username: Username,
    token_file: Option<PathBuf>,
}

impl LocalAuth {
    pub fn new(username: Username) -> Self {
        LocalAuth {
            username,
            token_file: None,
        }
    }

    #[inline]
    pub fn token_file(&self) -> Option<&PathBuf> {
        self.token_file.as_ref()
    }

    /// Take the token file path from a PegasusAuthenticate challenge
    pub fn update_from_challenge(&mut self, challenge: &Challenge) -> bool {
        if !challenge.is_scheme("local") {
            return false;
        }
        match challenge.token() {
            Some(path) if !path.is_empty() => {
                self.token_file = Some(PathBuf::from(path));
                true
            }
            _ => false,
        }
    }

    pub fn header_value(&self) -> String {
        if let Some(path) = &self.token_file {
            match fs::read_to_string(path) {
                Ok(token) => {
                    return format!(
                        "Local \"{}:{}:{}\"",
                        self.username,
                        path.display(),
                        token.trim_end_matches(['\r', '\n'])
                    );
                }
                Err(e) => {
                    warn!(
                        "failed to read local auth token file {}: {e}",
                        path.display()
                    );
                }
            }
        }
        format!("Local \"{}\"", self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn auth() -> LocalAuth {
        LocalAuth::new(Username::from_original("root").unwrap())
    }

    #[test]
    fn username_only() {
        assert_eq!(auth().header_value(), "Local \"root\"");
    }

    #[test]
    fn with_token_file() {
        let path = std::env::temp_dir().join(format!("wbem-local-auth-{}", std::process::id()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(b"0123456789abcdef\n").unwrap();
        drop(f);

        let mut a = auth();
        let challenge = Challenge::parse_all(&format!("Local \"{}\"", path.display()))
            .unwrap()
            .remove(0);
        assert!(a.update_from_challenge(&challenge));
        assert_eq!(
            a.header_value(),
            format!("Local \"root:{}:0123456789abcdef\"", path.display())
        );
        fs::remove_file(&path).unwrap();

        // degrade to the username only form if the file is gone
        assert_eq!(a.header_value(), "Local \"root\"");
    }

    #[test]
    fn other_scheme() {
        let mut a = auth();
        let challenge = Challenge::parse_all("Basic realm=x").unwrap().remove(0);
        assert!(!a.update_from_challenge(&challenge));
        assert!(a.token_file().is_none());
    }
}
