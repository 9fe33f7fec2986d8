// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration errors.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error suitable for terminal rendering via miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to parse or deserialize the configuration.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(sahayak::config::parse),
        help("check sahayak.toml against the documented schema; unknown keys are rejected")
    )]
    Parse { message: String },

    /// A deserialized value violates a semantic constraint.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(sahayak::config::validation))]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Parse {
            message: e.to_string(),
        }
    }
}

/// Render a list of configuration errors to stderr as miette reports.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(error.to_string());
        eprintln!("{report:?}");
    }
}
