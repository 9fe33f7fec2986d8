// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test fixtures: mock remote adapters and a temp-dir store harness.
//!
//! Nothing in this crate touches the network. The mocks implement the same
//! traits the HTTP client does, so engine and gate tests swap them in via
//! `Arc<dyn _>` without any feature flags.

pub mod harness;
pub mod jwt;
pub mod mock_auth;
pub mod mock_coach;

pub use harness::StoreHarness;
pub use jwt::make_jwt;
pub use mock_auth::{MockAuthApi, RefreshBehavior};
pub use mock_coach::{CoachOutcome, MockCoachApi};
