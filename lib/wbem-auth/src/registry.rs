/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex};

use crate::{AuthInfo, AuthScheme};

pub type SharedAuthInfo = Arc<Mutex<AuthInfo>>;

/// Where an auth info applies, unset fields match anything
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthScope {
    pub module: Option<String>,
    pub proxy: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub realm: Option<String>,
    pub scheme: Option<AuthScheme>,
}

fn field_match<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn str_field_match(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => true,
    }
}

impl AuthScope {
    pub fn matches(&self, other: &AuthScope) -> bool {
        self.proxy == other.proxy
            && str_field_match(&self.module, &other.module)
            && str_field_match(&self.host, &other.host)
            && field_match(&self.port, &other.port)
            && str_field_match(&self.protocol, &other.protocol)
            && field_match(&self.realm, &other.realm)
            && field_match(&self.scheme, &other.scheme)
    }
}

/// The auth infos known to a client, shared by all its connections
#[derive(Default)]
pub struct AuthorizationRegistry {
    entries: Mutex<Vec<(AuthScope, SharedAuthInfo)>>,
}

impl AuthorizationRegistry {
    pub fn new() -> Self {
        AuthorizationRegistry::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(AuthScope, SharedAuthInfo)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the first info whose scope matches
    pub fn lookup(&self, scope: &AuthScope) -> Option<SharedAuthInfo> {
        self.lock()
            .iter()
            .find(|(s, _)| s.matches(scope))
            .map(|(_, info)| info.clone())
    }

    pub fn insert(&self, scope: AuthScope, info: AuthInfo) -> SharedAuthInfo {
        let info = Arc::new(Mutex::new(info));
        self.lock().push((scope, info.clone()));
        info
    }

    /// Return the matching info, or add the one created by `f`.
    ///
    /// The lookup and the insert are done under the same lock.
    pub fn get_or_try_insert_with<F, E>(&self, scope: AuthScope, f: F) -> Result<SharedAuthInfo, E>
    where
        F: FnOnce() -> Result<AuthInfo, E>,
    {
        let mut entries = self.lock();
        if let Some((_, info)) = entries.iter().find(|(s, _)| s.matches(&scope)) {
            return Ok(info.clone());
        }
        let info = Arc::new(Mutex::new(f()?));
        entries.push((scope, info.clone()));
        Ok(info)
    }

    /// Remove every info whose scope matches
    pub fn remove(&self, scope: &AuthScope) -> usize {
        let mut entries = self.lock();
        let old = entries.len();
        entries.retain(|(s, _)| !s.matches(scope));
        old - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
