/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, MutexGuard};

use wbem_auth::{
    AuthError, AuthInfo, AuthInfoFactory, AuthModule, AuthScope, AuthorizationRegistry,
    Challenge, SharedAuthInfo,
};
use wbem_http::HeaderBag;
use wbem_http::header::{PEGASUS_AUTHENTICATE, WWW_AUTHENTICATE};
use wbem_types::auth::{Password, Username};
use wbem_types::net::Destination;

use crate::ClientError;

pub(crate) fn lock_info(info: &SharedAuthInfo) -> MutexGuard<'_, AuthInfo> {
    info.lock().unwrap_or_else(|e| e.into_inner())
}

/// Resolves the auth info of requests through the shared registry
pub struct ClientAuth {
    module: AuthModule,
    username: Option<Username>,
    password: Password,
    factory: Option<Arc<dyn AuthInfoFactory>>,
    registry: Arc<AuthorizationRegistry>,
}

impl ClientAuth {
    pub fn new(
        module: AuthModule,
        username: Option<Username>,
        password: Password,
        registry: Arc<AuthorizationRegistry>,
    ) -> Self {
        ClientAuth {
            module,
            username,
            password,
            factory: None,
            registry,
        }
    }

    /// Set the factory used when the module is `AuthModule::Custom`
    pub fn set_factory(&mut self, factory: Arc<dyn AuthInfoFactory>) {
        self.factory = Some(factory);
    }

    #[inline]
    pub fn module(&self) -> &AuthModule {
        &self.module
    }

    #[inline]
    pub fn registry(&self) -> &Arc<AuthorizationRegistry> {
        &self.registry
    }

    fn scope(&self, destination: &Destination) -> AuthScope {
        AuthScope {
            module: Some(self.module.as_str().to_string()),
            proxy: false,
            host: Some(destination.host().to_string()),
            port: Some(destination.port()),
            protocol: Some(destination.scheme().as_str().to_string()),
            realm: None,
            scheme: None,
        }
    }

    fn custom_factory(&self) -> Result<&Arc<dyn AuthInfoFactory>, AuthError> {
        self.factory
            .as_ref()
            .ok_or_else(|| AuthError::UnknownModule(self.module.as_str().to_string()))
    }

    /// The info to use for the first request to `destination`.
    ///
    /// This is either one created by an earlier challenge, or a new one if
    /// the scheme the module starts with is sent without waiting for a challenge.
    pub fn initial(&self, destination: &Destination) -> Result<Option<SharedAuthInfo>, ClientError> {
        let mut scope = self.scope(destination);
        if let Some(info) = self.registry.lookup(&scope) {
            return Ok(Some(info));
        }
        let Some(username) = &self.username else {
            return Ok(None);
        };

        let proactive = match &self.module {
            AuthModule::Custom(_) => self.custom_factory()?.proactive(username, &self.password),
            module => module.proactive_info(username),
        };
        let Some(info) = proactive.filter(AuthInfo::send_proactively) else {
            return Ok(None);
        };
        scope.scheme = Some(info.scheme());
        let shared = self
            .registry
            .get_or_try_insert_with(scope, || Ok::<_, AuthError>(info))?;
        Ok(Some(shared))
    }

    fn collect_challenges(headers: &HeaderBag) -> Result<Vec<Challenge>, AuthError> {
        let mut challenges = Vec::new();
        for name in [WWW_AUTHENTICATE, PEGASUS_AUTHENTICATE] {
            if let Some(value) = headers.get(name) {
                challenges.extend(Challenge::parse_all(value)?);
            }
        }
        Ok(challenges)
    }

    /// Handle the challenges of a 401 response.
    ///
    /// The matching registry entry is updated, or a new one is added.
    pub fn on_challenge(
        &self,
        destination: &Destination,
        headers: &HeaderBag,
    ) -> Result<SharedAuthInfo, ClientError> {
        let challenges = Self::collect_challenges(headers)?;
        if challenges.is_empty() {
            return Err(AuthError::NoSupportedChallenge(self.module.to_string()).into());
        }
        let Some(username) = &self.username else {
            return Err(AuthError::NoCredentials.into());
        };

        let (challenge, info) = match &self.module {
            AuthModule::Custom(_) => {
                let (index, info) =
                    self.custom_factory()?
                        .create(&challenges, username, &self.password)?;
                let challenge = challenges
                    .get(index)
                    .ok_or_else(|| AuthError::NoSupportedChallenge(self.module.to_string()))?;
                (challenge, info)
            }
            module => {
                let (_, challenge) = module
                    .select_challenge(&challenges)
                    .ok_or_else(|| AuthError::NoSupportedChallenge(self.module.to_string()))?;
                let info = module.new_info(challenge, username, &self.password)?;
                (challenge, info)
            }
        };

        let mut scope = self.scope(destination);
        scope.realm = challenge.realm().map(|s| s.to_string());
        scope.scheme = Some(info.scheme());
        log::info!(
            "got {} challenge from {destination} with realm {:?}",
            challenge.scheme(),
            scope.realm
        );

        let mut created = false;
        let shared = self.registry.get_or_try_insert_with(scope, || {
            created = true;
            Ok::<_, AuthError>(info)
        })?;
        if !created {
            lock_info(&shared).update_from_challenge(challenge)?;
        }
        Ok(shared)
    }

    /// Drop every info known for `destination`
    pub fn forget(&self, destination: &Destination) -> usize {
        self.registry.remove(&self.scope(destination))
    }
}
