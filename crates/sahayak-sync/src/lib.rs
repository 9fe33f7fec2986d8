// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync engine for the Sahayak offline-first chat core.
//!
//! Owns every message delivery-state transition: inline sends when online,
//! the durable outbox when offline, and serialized drains triggered by
//! connectivity restoration.

pub mod engine;

pub use engine::{DrainReport, SendOutcome, SyncEngine, SyncSettings};
