// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sahayak.toml` > `~/.config/sahayak/sahayak.toml`
//! > `/etc/sahayak/sahayak.toml` with environment variable overrides via the
//! `SAHAYAK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SahayakConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sahayak/sahayak.toml` (system-wide)
/// 3. `~/.config/sahayak/sahayak.toml` (user XDG config)
/// 4. `./sahayak.toml` (local directory)
/// 5. `SAHAYAK_*` environment variables
pub fn load_config() -> Result<SahayakConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SahayakConfig::default()))
        .merge(Toml::file("/etc/sahayak/sahayak.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("sahayak/sahayak.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("sahayak.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SahayakConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SahayakConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SahayakConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SahayakConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SAHAYAK_API_BASE_URL` must map to
/// `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("SAHAYAK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("client_", "client.", 1)
            .replacen("api_", "api.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("sync_", "sync.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_from_empty_toml() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.sync.retention_cap, 10);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [api]
            base_url = "https://coach.example.org"
            timeout_secs = 10

            [sync]
            retention_cap = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://coach.example.org");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.sync.retention_cap, 3);
        // Untouched sections keep defaults.
        assert_eq!(config.sync.max_attempts, 5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [api]
            base_uri = "typo"
            "#,
        );
        assert!(result.is_err(), "unknown key should be rejected");
    }
}
