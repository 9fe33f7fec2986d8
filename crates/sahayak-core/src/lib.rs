// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sahayak offline-first sync engine.
//!
//! This crate provides the error type, domain types, connectivity signal,
//! and remote-API trait definitions used throughout the Sahayak workspace.

pub mod connectivity;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use connectivity::{Connectivity, ConnectivityState};
pub use error::SahayakError;
pub use traits::{AuthApi, CoachApi};
