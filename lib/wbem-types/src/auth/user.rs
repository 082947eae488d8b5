/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use anyhow::anyhow;

const USERNAME_MAX_LENGTH: usize = u8::MAX as usize;
const PASSWORD_MAX_LENGTH: usize = u8::MAX as usize;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Username {
    inner: String,
}

impl Username {
    pub fn empty() -> Self {
        Username {
            inner: String::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn from_original(s: &str) -> anyhow::Result<Self> {
        if s.len() > USERNAME_MAX_LENGTH {
            return Err(anyhow!("too long string for a username"));
        }
        // the basic scheme uses the first colon as delimiter
        if s.contains(':') {
            return Err(anyhow!("colon character is not allowed"));
        }
        Ok(Username {
            inner: s.to_string(),
        })
    }

    #[inline]
    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Password {
    inner: String,
}

impl Password {
    pub fn empty() -> Self {
        Password {
            inner: String::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn from_original(s: &str) -> anyhow::Result<Self> {
        if s.len() > PASSWORD_MAX_LENGTH {
            return Err(anyhow!("too long string for a password"));
        }
        Ok(Password {
            inner: s.to_string(),
        })
    }

    #[inline]
    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username() {
        let u = Username::from_original("root").unwrap();
        assert_eq!(u.as_original(), "root");
        assert_eq!(u.len(), 4);
        assert!(!u.is_empty());

        assert!(Username::from_original("ro:ot").is_err());
        assert!(Username::from_original(&"a".repeat(256)).is_err());
        assert!(Username::empty().is_empty());
    }

    #[test]
    fn password() {
        let p = Password::from_original("p@ss:w0rd").unwrap();
        assert_eq!(p.as_original(), "p@ss:w0rd");
        assert_eq!(format!("{p:?}"), "Password(***)");
        assert!(Password::from_original(&"a".repeat(256)).is_err());
    }
}
