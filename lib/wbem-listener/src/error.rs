/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("invalid config: {0:?}")]
    InvalidConfig(anyhow::Error),
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, io::Error),
    #[error("failed to spawn thread: {0}")]
    SpawnFailed(io::Error),
}

/// The failure of a content handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A known protocol error, answered with its own status
    #[error("{status}: {reason}")]
    Protocol {
        status: StatusCode,
        reason: String,
        /// Sent in the CIMError header
        cim_error: Option<String>,
    },
    #[error("handler failed: {0:?}")]
    Internal(#[from] anyhow::Error),
    #[error("io failed: {0}")]
    Io(#[from] io::Error),
}

impl HandlerError {
    pub fn protocol(status: StatusCode, reason: &str) -> Self {
        HandlerError::Protocol {
            status,
            reason: reason.to_string(),
            cim_error: None,
        }
    }

    pub fn cim_error(status: StatusCode, cim_error: &str) -> Self {
        HandlerError::Protocol {
            status,
            reason: cim_error.to_string(),
            cim_error: Some(cim_error.to_string()),
        }
    }

    /// Status of the response, 501 for everything not declared by the handler
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Protocol { status, .. } => *status,
            _ => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status() {
        let e = HandlerError::cim_error(StatusCode::BAD_REQUEST, "request-not-valid");
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        let e = HandlerError::from(anyhow::anyhow!("boom"));
        assert_eq!(e.status(), StatusCode::NOT_IMPLEMENTED);
        let e = HandlerError::from(io::Error::other("broken"));
        assert_eq!(e.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
