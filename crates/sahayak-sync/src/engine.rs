// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sync engine: the single mutator of message delivery state.
//!
//! Sends go inline when the device is online and into the durable outbox
//! when it is not. A drain replays queued sends sequentially, oldest first,
//! and is serialized by a mutex so two triggers can never double-deliver.
//! Every state transition hits the local store before it is reported to the
//! caller.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sahayak_auth::SessionGate;
use sahayak_core::types::{
    ActionKind, ActionPayload, ChatMessage, CoachReply, CoachRequest, Conversation,
    DeliveryStatus, PendingAction, Role,
};
use sahayak_core::{CoachApi, Connectivity, ConnectivityState, SahayakError};
use sahayak_storage::{now_millis, LocalStore};

/// Maximum characters of a first message used as the conversation title.
const TITLE_MAX_CHARS: usize = 40;

/// Tuning knobs for the engine, mirrored from `[sync]` and `[client]`
/// config.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Live conversations retained per owner; older ones are evicted.
    pub retention_cap: usize,
    /// Queued-send attempts before the message is marked failed.
    pub max_attempts: u32,
    /// Language sent with coach requests when the stored `language`
    /// setting is absent.
    pub default_language: Option<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            retention_cap: 10,
            max_attempts: 5,
            default_language: None,
        }
    }
}

/// What happened to a [`SyncEngine::send_message`] call.
#[derive(Debug)]
pub enum SendOutcome {
    /// Delivered inline; the assistant reply is already persisted.
    Sent {
        user_message: ChatMessage,
        reply: ChatMessage,
    },
    /// Queued for a later drain; the message stays `pending`.
    Queued {
        user_message: ChatMessage,
        action_id: String,
    },
    /// Inline delivery failed; the message is marked `failed` and the user
    /// must resend explicitly.
    Failed {
        user_message: ChatMessage,
        error: SahayakError,
    },
}

/// Tally of one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Actions looked at this pass.
    pub processed: usize,
    /// Delivered and removed from the queue.
    pub sent: usize,
    /// Failed transiently and left queued with a bumped retry count.
    pub retried: usize,
    /// Removed after exhausting retries or a permanent rejection.
    pub abandoned: usize,
    /// True when the drain stopped early on a rejected bearer token.
    pub halted_on_auth: bool,
}

pub struct SyncEngine {
    store: Arc<LocalStore>,
    coach: Arc<dyn CoachApi>,
    gate: Arc<SessionGate>,
    connectivity: Connectivity,
    settings: SyncSettings,
    // Serializes drains. Guards nothing by itself; the store is the truth.
    drain_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<LocalStore>,
        coach: Arc<dyn CoachApi>,
        gate: Arc<SessionGate>,
        connectivity: Connectivity,
        settings: SyncSettings,
    ) -> Self {
        Self {
            store,
            coach,
            gate,
            connectivity,
            settings,
            drain_lock: Mutex::new(()),
        }
    }

    /// Record a user message and deliver it now or later.
    ///
    /// With no `conversation_id`, a conversation is created titled with the
    /// message's first words. The message is persisted as `pending` before
    /// any network activity, so a crash mid-send loses nothing.
    pub async fn send_message(
        &self,
        teacher_id: &str,
        conversation_id: Option<&str>,
        content: &str,
    ) -> Result<SendOutcome, SahayakError> {
        if content.trim().is_empty() {
            return Err(SahayakError::Validation(
                "message content must not be empty".into(),
            ));
        }

        let now = now_millis();
        let (conversation, message_ts) = match conversation_id {
            Some(id) => {
                let conversation = self.store.conversation(id).await?.ok_or_else(|| {
                    SahayakError::NotFound {
                        entity: "conversation",
                        key: id.to_string(),
                    }
                })?;
                // Stay strictly after the conversation's last activity even
                // within the same millisecond.
                let ts = now.max(conversation.updated_at + 1);
                (conversation, ts)
            }
            None => {
                let conversation = Conversation {
                    id: Uuid::new_v4().to_string(),
                    teacher_id: teacher_id.to_string(),
                    title: title_from(content),
                    last_message_preview: None,
                    updated_at: now,
                    deleted_at: None,
                };
                self.store.upsert_conversation(&conversation).await?;
                (conversation, now)
            }
        };

        let user_message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            teacher_id: teacher_id.to_string(),
            conversation_id: conversation.id.clone(),
            role: Role::User,
            content: content.to_string(),
            timestamp: message_ts,
            status: DeliveryStatus::Pending,
        };
        self.store.insert_message(&user_message).await?;

        if !self.connectivity.is_online() {
            let action = PendingAction {
                id: Uuid::new_v4().to_string(),
                payload: ActionPayload::SendMessage {
                    message_id: user_message.id.clone(),
                    conversation_id: conversation.id.clone(),
                    content: content.to_string(),
                },
                retries: 0,
                created_at: now,
            };
            self.store.enqueue_action(&action).await?;
            debug!(action_id = %action.id, "offline, send queued");
            return Ok(SendOutcome::Queued {
                user_message,
                action_id: action.id,
            });
        }

        match self.deliver(&user_message).await {
            Ok(reply) => Ok(SendOutcome::Sent {
                user_message,
                reply,
            }),
            Err(error) => {
                self.store
                    .set_message_status(&user_message.id, DeliveryStatus::Failed)
                    .await?;
                if error.is_auth() {
                    self.gate.handle_unauthorized().await?;
                }
                warn!(message_id = %user_message.id, error = %error, "inline send failed");
                Ok(SendOutcome::Failed {
                    user_message,
                    error,
                })
            }
        }
    }

    /// Replay queued sends, oldest first. At most one drain runs at a time;
    /// a second caller waits and then sees an empty queue. Offline drains
    /// are a no-op.
    pub async fn drain(&self) -> Result<DrainReport, SahayakError> {
        let _guard = self.drain_lock.lock().await;
        let mut report = DrainReport::default();

        if !self.connectivity.is_online() {
            debug!("drain skipped, offline");
            return Ok(report);
        }
        let actions = self.store.pending_actions(ActionKind::SendMessage).await?;
        if actions.is_empty() {
            return Ok(report);
        }
        info!(queued = actions.len(), "draining outbox");

        for action in actions {
            report.processed += 1;
            let ActionPayload::SendMessage { message_id, .. } = &action.payload;

            let Some(message) = self.store.message(message_id).await? else {
                // The conversation was deleted out from under the queue.
                warn!(action_id = %action.id, "queued message no longer exists, dropping action");
                self.store.remove_action(&action.id).await?;
                report.abandoned += 1;
                continue;
            };

            match self.deliver(&message).await {
                Ok(_) => {
                    self.store.remove_action(&action.id).await?;
                    report.sent += 1;
                }
                Err(e) if e.is_auth() => {
                    // Credential is dead; nothing behind this action can
                    // succeed either. Keep the whole queue for after login.
                    warn!(error = %e, "drain halted, bearer token rejected");
                    self.gate.handle_unauthorized().await?;
                    report.halted_on_auth = true;
                    break;
                }
                Err(e) if e.is_transient() => {
                    let retries = self.store.mark_retry(&action.id).await?;
                    if retries >= i64::from(self.settings.max_attempts) {
                        warn!(action_id = %action.id, retries, "retries exhausted, abandoning send");
                        self.store.remove_action(&action.id).await?;
                        self.store
                            .set_message_status(&message.id, DeliveryStatus::Failed)
                            .await?;
                        report.abandoned += 1;
                    } else {
                        debug!(action_id = %action.id, retries, error = %e, "send failed, will retry");
                        report.retried += 1;
                    }
                }
                Err(e) => {
                    // Permanent rejection; retrying the same payload cannot
                    // help.
                    warn!(action_id = %action.id, error = %e, "send rejected, abandoning");
                    self.store.remove_action(&action.id).await?;
                    self.store
                        .set_message_status(&message.id, DeliveryStatus::Failed)
                        .await?;
                    report.abandoned += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            sent = report.sent,
            retried = report.retried,
            abandoned = report.abandoned,
            "drain finished"
        );
        Ok(report)
    }

    /// Drive drains from connectivity: once at startup when online, then on
    /// every offline-to-online transition. Runs until every [`Connectivity`]
    /// handle is dropped.
    pub async fn run(self: Arc<Self>) {
        let mut rx = self.connectivity.subscribe();
        rx.borrow_and_update();

        if self.connectivity.is_online() {
            if let Err(e) = self.drain().await {
                warn!(error = %e, "startup drain failed");
            }
        }

        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            if state == ConnectivityState::Online {
                info!("connectivity restored, draining outbox");
                if let Err(e) = self.drain().await {
                    warn!(error = %e, "reconnect drain failed");
                }
            }
        }
    }

    /// One confirmed round-trip for a pending user message: coach call,
    /// status flip, assistant reply, conversation bump, retention sweep.
    async fn deliver(&self, message: &ChatMessage) -> Result<ChatMessage, SahayakError> {
        let token = self.gate.access_token().await?;
        let request = self.build_request(&message.content).await?;
        let CoachReply { output, .. } = self.coach.coach(&token, &request).await?;

        self.store
            .set_message_status(&message.id, DeliveryStatus::Sent)
            .await?;

        // Keep per-conversation timestamps strictly increasing even when
        // the round-trip completes within one millisecond.
        let reply_ts = now_millis().max(message.timestamp + 1);
        let reply = ChatMessage {
            id: Uuid::new_v4().to_string(),
            teacher_id: message.teacher_id.clone(),
            conversation_id: message.conversation_id.clone(),
            role: Role::Assistant,
            content: output,
            timestamp: reply_ts,
            status: DeliveryStatus::Sent,
        };
        self.store.insert_message(&reply).await?;
        self.store
            .touch_conversation(&message.conversation_id, &preview_from(&reply.content), reply_ts)
            .await?;

        let evicted = self
            .store
            .evict_conversations(&message.teacher_id, self.settings.retention_cap)
            .await?;
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted conversations beyond retention cap");
        }

        Ok(reply)
    }

    /// Coach payloads carry the teacher's current context, read at delivery
    /// time rather than frozen into the queue.
    async fn build_request(&self, prompt: &str) -> Result<CoachRequest, SahayakError> {
        let language = match self.store.setting_str("language").await? {
            Some(language) => Some(language),
            None => self.settings.default_language.clone(),
        };
        Ok(CoachRequest {
            prompt: prompt.to_string(),
            grade: self.store.setting_u32("grade").await?,
            subject: self.store.setting_str("subject").await?,
            language,
            time_left_minutes: self.store.setting_u32("time_left_minutes").await?,
        })
    }
}

fn title_from(content: &str) -> String {
    let trimmed = content.trim();
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        title.push('…');
    }
    title
}

fn preview_from(content: &str) -> String {
    content.trim().chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sahayak_core::types::AuthSession;
    use sahayak_test_utils::{make_jwt, MockAuthApi, MockCoachApi, StoreHarness};

    const OWNER: &str = "teacher-1";

    struct Fixture {
        engine: Arc<SyncEngine>,
        coach: Arc<MockCoachApi>,
        auth: Arc<MockAuthApi>,
        harness: StoreHarness,
        connectivity: Connectivity,
    }

    async fn fixture(connectivity: Connectivity, settings: SyncSettings) -> Fixture {
        let harness = StoreHarness::new().await.unwrap();
        let coach = Arc::new(MockCoachApi::new());
        let auth = Arc::new(MockAuthApi::new(OWNER));
        let gate = Arc::new(SessionGate::new(
            harness.store.clone(),
            auth.clone(),
            connectivity.clone(),
        ));

        harness
            .store
            .save_session(&AuthSession {
                access_token: make_jwt(OWNER),
                refresh_token: "refresh".into(),
                teacher_id: Some(OWNER.into()),
                expires_at: None,
            })
            .await
            .unwrap();

        let engine = Arc::new(SyncEngine::new(
            harness.store.clone(),
            coach.clone(),
            gate,
            connectivity.clone(),
            settings,
        ));
        Fixture {
            engine,
            coach,
            auth,
            harness,
            connectivity,
        }
    }

    #[tokio::test]
    async fn online_send_delivers_inline() {
        let f = fixture(Connectivity::online(), SyncSettings::default()).await;
        f.coach.push_reply("use visual aids").await;

        let outcome = f
            .engine
            .send_message(OWNER, None, "How do I teach fractions to class 5?")
            .await
            .unwrap();

        let SendOutcome::Sent {
            user_message,
            reply,
        } = outcome
        else {
            panic!("expected inline send");
        };
        assert_eq!(reply.content, "use visual aids");
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.timestamp > user_message.timestamp);

        let stored = f.harness.store.message(&user_message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Sent);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);

        let convs = f.harness.store.conversations(OWNER).await.unwrap();
        assert_eq!(convs.len(), 1);
        assert!(convs[0].title.starts_with("How do I teach fractions"));
        assert_eq!(convs[0].updated_at, reply.timestamp);
    }

    #[tokio::test]
    async fn offline_send_queues_without_network() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;

        let outcome = f
            .engine
            .send_message(OWNER, None, "remember this for later")
            .await
            .unwrap();

        let SendOutcome::Queued { user_message, .. } = outcome else {
            panic!("expected queued send");
        };
        assert_eq!(user_message.status, DeliveryStatus::Pending);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 1);
        assert_eq!(f.coach.call_count(), 0);
    }

    #[tokio::test]
    async fn offline_round_trip_drains_to_sent() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        let SendOutcome::Queued { user_message, .. } = f
            .engine
            .send_message(OWNER, None, "queued while offline")
            .await
            .unwrap()
        else {
            panic!("expected queued send");
        };

        f.coach.push_reply("here is the plan").await;
        f.connectivity.set(ConnectivityState::Online);
        let report = f.engine.drain().await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.sent, 1);

        let stored = f.harness.store.message(&user_message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Sent);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);

        let msgs = f
            .harness
            .store
            .messages(&user_message.conversation_id)
            .await
            .unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].role, Role::Assistant);
        assert_eq!(msgs[1].content, "here is the plan");
    }

    #[tokio::test]
    async fn concurrent_drains_deliver_at_most_once() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        f.engine
            .send_message(OWNER, None, "exactly once please")
            .await
            .unwrap();
        f.connectivity.set(ConnectivityState::Online);

        let (a, b) = tokio::join!(f.engine.drain(), f.engine.drain());
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.sent + b.sent, 1);
        assert_eq!(f.coach.call_count(), 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn drain_is_a_noop_while_offline() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        f.engine.send_message(OWNER, None, "still offline").await.unwrap();

        let report = f.engine.drain().await.unwrap();
        assert_eq!(report, DrainReport::default());
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn timestamps_stay_ordered_within_a_conversation() {
        let f = fixture(Connectivity::online(), SyncSettings::default()).await;

        let SendOutcome::Sent { user_message, .. } = f
            .engine
            .send_message(OWNER, None, "first")
            .await
            .unwrap()
        else {
            panic!("expected inline send");
        };
        let cid = user_message.conversation_id.clone();
        f.engine
            .send_message(OWNER, Some(&cid), "second")
            .await
            .unwrap();

        let msgs = f.harness.store.messages(&cid).await.unwrap();
        assert_eq!(msgs.len(), 4);
        for pair in msgs.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn retention_cap_keeps_most_recent_conversations() {
        let settings = SyncSettings {
            retention_cap: 3,
            ..SyncSettings::default()
        };
        let f = fixture(Connectivity::online(), settings).await;

        let mut first_id = None;
        for i in 0..5 {
            let outcome = f
                .engine
                .send_message(OWNER, None, &format!("topic {i}"))
                .await
                .unwrap();
            if let (0, SendOutcome::Sent { user_message, .. }) = (i, &outcome) {
                first_id = Some(user_message.conversation_id.clone());
            }
        }

        assert_eq!(f.harness.store.conversation_count(OWNER).await.unwrap(), 3);
        let oldest = f
            .harness
            .store
            .conversation(&first_id.unwrap())
            .await
            .unwrap();
        assert!(oldest.is_none());
    }

    #[tokio::test]
    async fn transient_failures_retry_then_abandon() {
        let settings = SyncSettings {
            max_attempts: 2,
            ..SyncSettings::default()
        };
        let f = fixture(Connectivity::offline(), settings).await;
        let SendOutcome::Queued { user_message, .. } = f
            .engine
            .send_message(OWNER, None, "doomed")
            .await
            .unwrap()
        else {
            panic!("expected queued send");
        };
        f.connectivity.set(ConnectivityState::Online);

        f.coach.push_failure(Some(503)).await;
        let report = f.engine.drain().await.unwrap();
        assert_eq!(report.retried, 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 1);

        f.coach.push_failure(None).await;
        let report = f.engine.drain().await.unwrap();
        assert_eq!(report.abandoned, 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);

        let stored = f.harness.store.message(&user_message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn failed_send_does_not_block_later_sends() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        let SendOutcome::Queued {
            user_message: stuck,
            ..
        } = f.engine.send_message(OWNER, None, "flaky one").await.unwrap()
        else {
            panic!("expected queued send");
        };
        let SendOutcome::Queued {
            user_message: healthy,
            ..
        } = f.engine.send_message(OWNER, None, "healthy two").await.unwrap()
        else {
            panic!("expected queued send");
        };
        f.connectivity.set(ConnectivityState::Online);

        // The older action bounces transiently; the younger one behind it
        // must still be delivered in the same pass.
        f.coach.push_failure(Some(503)).await;
        f.coach.push_reply("made it through").await;
        let report = f.engine.drain().await.unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.retried, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 1);

        let stuck = f.harness.store.message(&stuck.id).await.unwrap().unwrap();
        assert_eq!(stuck.status, DeliveryStatus::Pending);
        let healthy = f.harness.store.message(&healthy.id).await.unwrap().unwrap();
        assert_eq!(healthy.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn rejected_token_halts_drain_and_preserves_queue() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        f.engine.send_message(OWNER, None, "one").await.unwrap();
        f.engine.send_message(OWNER, None, "two").await.unwrap();
        f.connectivity.set(ConnectivityState::Online);

        f.coach.push_failure(Some(401)).await;
        let report = f.engine.drain().await.unwrap();

        assert!(report.halted_on_auth);
        assert_eq!(report.sent, 0);
        assert_eq!(f.coach.call_count(), 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 2);
        assert!(f.harness.store.session().await.unwrap().is_none());
        assert_eq!(f.auth.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn permanent_rejection_abandons_without_retry() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        let SendOutcome::Queued { user_message, .. } = f
            .engine
            .send_message(OWNER, None, "bad payload")
            .await
            .unwrap()
        else {
            panic!("expected queued send");
        };
        f.connectivity.set(ConnectivityState::Online);

        f.coach.push_failure(Some(400)).await;
        let report = f.engine.drain().await.unwrap();
        assert_eq!(report.abandoned, 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);

        let stored = f.harness.store.message(&user_message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn inline_failure_marks_message_failed() {
        let f = fixture(Connectivity::online(), SyncSettings::default()).await;
        f.coach.push_failure(Some(500)).await;

        let outcome = f
            .engine
            .send_message(OWNER, None, "this will bounce")
            .await
            .unwrap();
        let SendOutcome::Failed { user_message, error } = outcome else {
            panic!("expected failed send");
        };
        assert!(error.is_transient());

        let stored = f.harness.store.message(&user_message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Failed);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn orphaned_action_is_dropped() {
        let f = fixture(Connectivity::online(), SyncSettings::default()).await;
        f.harness
            .store
            .enqueue_action(&PendingAction {
                id: "a1".into(),
                payload: ActionPayload::SendMessage {
                    message_id: "no-such-message".into(),
                    conversation_id: "no-such-conversation".into(),
                    content: "ghost".into(),
                },
                retries: 0,
                created_at: now_millis(),
            })
            .await
            .unwrap();

        let report = f.engine.drain().await.unwrap();
        assert_eq!(report.abandoned, 1);
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);
        assert_eq!(f.coach.call_count(), 0);
    }

    #[tokio::test]
    async fn coach_payload_reflects_current_settings() {
        let f = fixture(Connectivity::online(), SyncSettings::default()).await;
        f.harness
            .store
            .set_setting("grade", &serde_json::json!(5))
            .await
            .unwrap();
        f.harness
            .store
            .set_setting("subject", &serde_json::json!("maths"))
            .await
            .unwrap();
        f.harness
            .store
            .set_setting("language", &serde_json::json!("hi"))
            .await
            .unwrap();

        f.engine
            .send_message(OWNER, None, "fractions")
            .await
            .unwrap();

        let requests = f.coach.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].grade, Some(5));
        assert_eq!(requests[0].subject.as_deref(), Some("maths"));
        assert_eq!(requests[0].language.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn configured_language_fills_in_when_no_setting_is_stored() {
        let settings = SyncSettings {
            default_language: Some("hi".into()),
            ..SyncSettings::default()
        };
        let f = fixture(Connectivity::online(), settings).await;

        f.engine.send_message(OWNER, None, "fractions").await.unwrap();

        let requests = f.coach.requests().await;
        assert_eq!(requests[0].language.as_deref(), Some("hi"));

        // A stored language wins over the configured default.
        f.harness
            .store
            .set_setting("language", &serde_json::json!("mr"))
            .await
            .unwrap();
        f.engine.send_message(OWNER, None, "geometry").await.unwrap();

        let requests = f.coach.requests().await;
        assert_eq!(requests[1].language.as_deref(), Some("mr"));
    }

    #[tokio::test]
    async fn run_drains_on_reconnect() {
        let f = fixture(Connectivity::offline(), SyncSettings::default()).await;
        f.engine
            .send_message(OWNER, None, "send me on reconnect")
            .await
            .unwrap();

        let engine = f.engine.clone();
        let task = tokio::spawn(engine.run());

        f.connectivity.set(ConnectivityState::Online);
        // The watch wakeup and drain race this assertion; poll briefly.
        for _ in 0..50 {
            if f.harness.store.pending_count().await.unwrap() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(f.harness.store.pending_count().await.unwrap(), 0);
        assert_eq!(f.coach.call_count(), 1);
        task.abort();
    }

    #[tokio::test]
    async fn empty_content_is_rejected_synchronously() {
        let f = fixture(Connectivity::online(), SyncSettings::default()).await;
        let err = f.engine.send_message(OWNER, None, "   ").await.unwrap_err();
        assert!(matches!(err, SahayakError::Validation(_)));
        assert_eq!(f.harness.store.message_count().await.unwrap(), 0);
    }
}
