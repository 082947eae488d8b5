/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use wbem_types::auth::{Password, Username};

use crate::basic::BasicAuth;
use crate::digest::DigestAuth;
use crate::local::LocalAuth;
use crate::{AuthError, AuthInfo, Challenge};

/// Creates the auth info for an `AuthModule::Custom` module
pub trait AuthInfoFactory: Send + Sync {
    /// The info to start with before any challenge.
    ///
    /// It is only sent if `CustomAuth::send_proactively` says so.
    fn proactive(&self, _username: &Username, _password: &Password) -> Option<AuthInfo> {
        None
    }

    /// Pick one of the challenges and create the info for it.
    ///
    /// The returned index refers to the selected challenge.
    fn create(
        &self,
        challenges: &[Challenge],
        username: &Username,
        password: &Password,
    ) -> Result<(usize, AuthInfo), AuthError>;
}

/// Which authentication handling the client uses
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthModule {
    /// Only answer Basic challenges
    Basic,
    /// Answer Digest challenges, and Basic ones if no Digest challenge is offered
    #[default]
    Digest,
    /// The OpenPegasus local scheme, sent without waiting for a challenge
    Local,
    Custom(String),
}

impl AuthModule {
    pub fn as_str(&self) -> &str {
        match self {
            AuthModule::Basic => "basic",
            AuthModule::Digest => "digest",
            AuthModule::Local => "local",
            AuthModule::Custom(name) => name,
        }
    }

    /// The info to start with before any challenge is received,
    /// used if `AuthInfo::send_proactively` is set on it
    pub fn proactive_info(&self, username: &Username) -> Option<AuthInfo> {
        match self {
            AuthModule::Local => Some(AuthInfo::Local(LocalAuth::new(username.clone()))),
            _ => None,
        }
    }

    /// Select the challenge this module answers to
    pub fn select_challenge<'a>(&self, challenges: &'a [Challenge]) -> Option<(usize, &'a Challenge)> {
        let find = |scheme: &str| {
            challenges
                .iter()
                .enumerate()
                .find(|(_, c)| c.is_scheme(scheme))
        };
        match self {
            AuthModule::Basic => find("basic"),
            AuthModule::Digest => find("digest").or_else(|| find("basic")),
            AuthModule::Local => find("local"),
            AuthModule::Custom(_) => None,
        }
    }

    /// Create a new auth info for the selected challenge
    pub fn new_info(
        &self,
        challenge: &Challenge,
        username: &Username,
        password: &Password,
    ) -> Result<AuthInfo, AuthError> {
        let mut info = if challenge.is_scheme("digest") {
            AuthInfo::Digest(DigestAuth::new(username.clone(), password.clone()))
        } else if challenge.is_scheme("basic") {
            AuthInfo::Basic(BasicAuth::new(username.clone(), password.clone()))
        } else if challenge.is_scheme("local") {
            AuthInfo::Local(LocalAuth::new(username.clone()))
        } else {
            return Err(AuthError::NoSupportedChallenge(self.as_str().to_string()));
        };
        info.update_from_challenge(challenge)?;
        Ok(info)
    }
}

impl FromStr for AuthModule {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthModule::Basic),
            "digest" | "www" => Ok(AuthModule::Digest),
            "local" | "pegasus" => Ok(AuthModule::Local),
            "" => Err(AuthError::UnknownModule(String::new())),
            _ => Ok(AuthModule::Custom(s.to_string())),
        }
    }
}

impl fmt::Display for AuthModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
