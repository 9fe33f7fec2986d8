// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session gate for the Sahayak sync core.
//!
//! Owns the singleton cached credential record: OTP login and signup, token
//! refresh at startup, logout, and the offline-first bootstrap rule that a
//! cached access token admits the user without any network round-trip.

pub mod gate;
pub mod jwt;

pub use gate::{Bootstrap, SessionGate};
