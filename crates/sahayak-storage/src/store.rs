// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Local Store: the single owner of on-disk state.
//!
//! Every other component (Sync Engine, Session Gate, UI projection) reads
//! and writes through these operations; nobody holds a competing copy of
//! truth. Wraps a [`Database`] handle and delegates to the typed query
//! modules.

use sahayak_core::types::{
    ActionKind, AuthSession, ChatMessage, Conversation, DeliveryStatus, PendingAction,
    TeacherProfile,
};
use sahayak_core::SahayakError;
use tracing::debug;

use crate::database::Database;
use crate::queries;

/// SQLite-backed local store.
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    /// Open the store at `path`, running migrations. Migration failure is
    /// fatal to initialization.
    pub async fn open(path: &str) -> Result<Self, SahayakError> {
        let db = Database::open(path).await?;
        debug!(path, "local store opened");
        Ok(Self { db })
    }

    /// Flush and checkpoint before shutdown.
    pub async fn close(&self) -> Result<(), SahayakError> {
        self.db.close().await
    }

    /// Escape hatch for callers that need raw access (CLI diagnostics).
    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Session (singleton) ---

    pub async fn save_session(&self, session: &AuthSession) -> Result<(), SahayakError> {
        queries::session::save_session(&self.db, session).await
    }

    pub async fn session(&self) -> Result<Option<AuthSession>, SahayakError> {
        queries::session::get_session(&self.db).await
    }

    pub async fn clear_session(&self) -> Result<(), SahayakError> {
        queries::session::clear_session(&self.db).await
    }

    // --- Profile ---

    pub async fn upsert_profile(&self, profile: &TeacherProfile) -> Result<(), SahayakError> {
        queries::profile::upsert_profile(&self.db, profile).await
    }

    pub async fn profile(&self) -> Result<Option<TeacherProfile>, SahayakError> {
        queries::profile::get_profile(&self.db).await
    }

    // --- Conversations ---

    pub async fn upsert_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), SahayakError> {
        queries::conversations::upsert_conversation(&self.db, conversation).await
    }

    pub async fn conversation(&self, id: &str) -> Result<Option<Conversation>, SahayakError> {
        queries::conversations::get_conversation(&self.db, id).await
    }

    pub async fn conversations(
        &self,
        teacher_id: &str,
    ) -> Result<Vec<Conversation>, SahayakError> {
        queries::conversations::list_conversations(&self.db, teacher_id).await
    }

    pub async fn touch_conversation(
        &self,
        id: &str,
        preview: &str,
        updated_at: i64,
    ) -> Result<(), SahayakError> {
        queries::conversations::touch_conversation(&self.db, id, preview, updated_at).await
    }

    pub async fn tombstone_conversation(
        &self,
        id: &str,
        deleted_at: i64,
    ) -> Result<(), SahayakError> {
        queries::conversations::tombstone_conversation(&self.db, id, deleted_at).await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), SahayakError> {
        queries::conversations::delete_conversation(&self.db, id).await
    }

    /// Hard-evict conversations beyond the retention cap for an owner.
    /// Returns the evicted ids.
    pub async fn evict_conversations(
        &self,
        teacher_id: &str,
        cap: usize,
    ) -> Result<Vec<String>, SahayakError> {
        queries::conversations::evict_beyond_cap(&self.db, teacher_id, cap).await
    }

    pub async fn conversation_count(&self, teacher_id: &str) -> Result<i64, SahayakError> {
        queries::conversations::live_count(&self.db, teacher_id).await
    }

    // --- Messages ---

    pub async fn insert_message(&self, message: &ChatMessage) -> Result<(), SahayakError> {
        queries::messages::insert_message(&self.db, message).await
    }

    pub async fn message(&self, id: &str) -> Result<Option<ChatMessage>, SahayakError> {
        queries::messages::get_message(&self.db, id).await
    }

    pub async fn messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, SahayakError> {
        queries::messages::list_messages(&self.db, conversation_id).await
    }

    pub async fn set_message_status(
        &self,
        id: &str,
        status: DeliveryStatus,
    ) -> Result<(), SahayakError> {
        queries::messages::update_message_status(&self.db, id, status).await
    }

    pub async fn message_count(&self) -> Result<i64, SahayakError> {
        queries::messages::count_messages(&self.db).await
    }

    // --- Outbox ---

    pub async fn enqueue_action(&self, action: &PendingAction) -> Result<(), SahayakError> {
        queries::outbox::enqueue(&self.db, action).await
    }

    pub async fn pending_actions(
        &self,
        kind: ActionKind,
    ) -> Result<Vec<PendingAction>, SahayakError> {
        queries::outbox::dequeue_all(&self.db, kind).await
    }

    pub async fn mark_retry(&self, id: &str) -> Result<i64, SahayakError> {
        queries::outbox::mark_retry(&self.db, id).await
    }

    pub async fn remove_action(&self, id: &str) -> Result<(), SahayakError> {
        queries::outbox::remove(&self.db, id).await
    }

    pub async fn pending_count(&self) -> Result<i64, SahayakError> {
        queries::outbox::count(&self.db).await
    }

    // --- Settings ---

    pub async fn set_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), SahayakError> {
        queries::settings::set_setting(&self.db, key, value).await
    }

    pub async fn setting(&self, key: &str) -> Result<Option<serde_json::Value>, SahayakError> {
        queries::settings::get_setting(&self.db, key).await
    }

    /// Read a string-valued setting.
    pub async fn setting_str(&self, key: &str) -> Result<Option<String>, SahayakError> {
        Ok(self
            .setting(key)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Read an unsigned integer setting.
    pub async fn setting_u32(&self, key: &str) -> Result<Option<u32>, SahayakError> {
        Ok(self
            .setting(key)
            .await?
            .and_then(|v| v.as_u64())
            .map(|v| v as u32))
    }
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    queries::now_millis()
}
