// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sahayak sync core.

use thiserror::Error;

/// The primary error type used across the Sahayak workspace.
#[derive(Debug, Error)]
pub enum SahayakError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local store errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote API errors. `status` is `None` when the request never produced
    /// an HTTP response (connection refused, DNS failure, offline).
    #[error("api error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Session/credential errors (no cached session, refresh rejected).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Local input validation errors, surfaced synchronously to the caller
    /// and never persisted.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record expected to exist was not found in the local store.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SahayakError {
    /// True for failures worth retrying: the request never reached the
    /// server, timed out, was rate limited, or the server faulted.
    pub fn is_transient(&self) -> bool {
        match self {
            SahayakError::Api { status: None, .. } => true,
            SahayakError::Api {
                status: Some(code), ..
            } => matches!(code, 408 | 429 | 500..=599),
            SahayakError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// True when the bearer credential was rejected and only
    /// re-authentication can recover.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SahayakError::Api {
                status: Some(401),
                ..
            } | SahayakError::Auth(_)
        )
    }
}
