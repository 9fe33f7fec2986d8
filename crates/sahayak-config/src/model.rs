// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Sahayak sync core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Sahayak configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SahayakConfig {
    /// Client identity and behavior settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Remote coaching API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbox and sync engine settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Client identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default language sent with coach requests ("en", "hi", ...).
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            language: default_language(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Remote coaching API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the coaching backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Expiry is treated as a retryable
    /// failure by the sync engine.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Local store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("sahayak/sahayak.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "sahayak.db".to_string())
}

/// Outbox and sync engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Maximum number of live conversations retained per owner. The oldest
    /// beyond this cap are evicted after a successful sync.
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,

    /// Maximum replay attempts for a queued action before it is abandoned
    /// and the originating message marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retention_cap: default_retention_cap(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_retention_cap() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    5
}
