/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChallengeParseError {
    #[error("empty challenge")]
    Empty,
    #[error("no auth scheme found at offset {0}")]
    NoSchemeFound(usize),
    #[error("unexpected char '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("no '=' found after parameter {0}")]
    NoEqualsFound(String),
    #[error("no value found for parameter {0}")]
    NoValueFound(String),
    #[error("unterminated quoted string")]
    UnterminatedQuote,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid challenge: {0}")]
    InvalidChallenge(#[from] ChallengeParseError),
    #[error("no supported challenge found for auth module {0}")]
    NoSupportedChallenge(String),
    #[error("no nonce in digest challenge")]
    NoNonce,
    #[error("unsupported digest qop {0}")]
    UnsupportedQop(String),
    #[error("unsupported digest algorithm {0}")]
    UnsupportedAlgorithm(String),
    #[error("mutual authentication failed: {0}")]
    MutualAuthFailed(&'static str),
    #[error("no credentials configured")]
    NoCredentials,
    #[error("unknown auth module {0}")]
    UnknownModule(String),
}
