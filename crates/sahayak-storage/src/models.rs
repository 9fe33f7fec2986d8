// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `sahayak-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use sahayak_core::types::{
    ActionKind, ActionPayload, AuthSession, ChatMessage, Conversation, DeliveryStatus,
    PendingAction, Role, TeacherProfile,
};
