/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::{AuthError, ChallengeParseError};

mod challenge;
pub use challenge::{Challenge, parse_params};

pub mod basic;
pub mod digest;
pub mod local;

mod info;
pub use info::{AuthHeader, AuthInfo, AuthScheme, CustomAuth};

mod module;
pub use module::{AuthInfoFactory, AuthModule};

mod registry;
pub use registry::{AuthScope, AuthorizationRegistry, SharedAuthInfo};
