// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the remote coaching service.
//!
//! Implements the [`sahayak_core::CoachApi`] and [`sahayak_core::AuthApi`]
//! traits over reqwest with a hard per-request timeout.

pub mod client;
pub mod types;

pub use client::{HttpApiClient, DEFAULT_TIMEOUT};
