// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Sahayak workspace.
//!
//! Timestamps are epoch milliseconds (UTC), matching the representation the
//! coaching backend uses on the wire.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The singleton cached credential record. Absence means unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// The `sub` claim of the access token, when it could be decoded.
    pub teacher_id: Option<String>,
    /// Access token expiry in epoch milliseconds, when known.
    pub expires_at: Option<i64>,
}

/// Per-device teacher profile, synced opportunistically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub teacher_id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub onboarding_status: Option<i64>,
    pub last_synced_at: Option<i64>,
}

/// A chat thread owned by one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub teacher_id: String,
    pub title: String,
    pub last_message_preview: Option<String>,
    pub updated_at: i64,
    /// Soft-delete tombstone. Tombstoned conversations are hidden from
    /// listings but retained until hard eviction.
    pub deleted_at: Option<i64>,
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Delivery state of a locally authored message.
///
/// `Pending` is the optimistic-write state; the Sync Engine moves a message
/// to `Sent` or `Failed` exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

/// A single chat message. Ids are client-generated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub teacher_id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
    pub status: DeliveryStatus,
}

/// The kind of a queued action. Closed set; extend by adding variants here
/// and to [`ActionPayload`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum ActionKind {
    #[strum(serialize = "send-message")]
    #[serde(rename = "send-message")]
    SendMessage,
}

/// Tagged payload for a queued action. The tag doubles as the indexed
/// `kind` column in the outbox table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionPayload {
    SendMessage {
        message_id: String,
        conversation_id: String,
        content: String,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::SendMessage { .. } => ActionKind::SendMessage,
        }
    }
}

/// A durably queued operation awaiting replay against the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: String,
    pub payload: ActionPayload,
    pub retries: i64,
    pub created_at: i64,
}

// --- Remote API boundary types ---

/// Delivery channel for one-time passwords.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OtpChannel {
    Phone,
    Email,
}

/// Request body for the `coach` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left_minutes: Option<u32>,
}

/// Response body of the `coach` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachReply {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_used: Option<serde_json::Value>,
}

/// Access/refresh token pair issued on OTP verification or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Acknowledgement of an OTP request. `dev_otp` is only present in
/// development deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpTicket {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_otp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

/// Signup details exchanged for an OTP challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
}

/// A conversation summary as returned by the server listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub last_message_preview: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub worked: Option<bool>,
}
