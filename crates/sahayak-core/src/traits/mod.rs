// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the remote API boundary.
//!
//! The coaching backend is an external collaborator; these traits let the
//! Sync Engine and Session Gate be exercised against mock implementations.

pub mod auth;
pub mod coach;

pub use auth::AuthApi;
pub use coach::CoachApi;
