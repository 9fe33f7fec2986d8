// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated coaching endpoints consumed by the Sync Engine.

use async_trait::async_trait;

use crate::error::SahayakError;
use crate::types::{CoachReply, CoachRequest, RemoteConversation};

/// The authenticated surface of the remote coaching service.
///
/// All calls carry `Authorization: Bearer <access_token>`. Implementations
/// must map non-2xx responses to [`SahayakError::Api`] carrying the status
/// code and the server's `detail` message when present.
#[async_trait]
pub trait CoachApi: Send + Sync + 'static {
    /// Generate an assistant reply for a prompt.
    async fn coach(
        &self,
        access_token: &str,
        request: &CoachRequest,
    ) -> Result<CoachReply, SahayakError>;

    /// List the owner's conversations, most recently updated first.
    async fn list_conversations(
        &self,
        access_token: &str,
    ) -> Result<Vec<RemoteConversation>, SahayakError>;

    /// Delete a conversation on the server.
    async fn delete_conversation(
        &self,
        access_token: &str,
        conversation_id: &str,
    ) -> Result<(), SahayakError>;

    /// Submit whether the coaching advice worked.
    async fn submit_feedback(
        &self,
        access_token: &str,
        conversation_id: &str,
        worked: bool,
    ) -> Result<(), SahayakError>;
}
