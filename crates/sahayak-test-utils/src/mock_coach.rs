// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock coaching API for deterministic testing.
//!
//! Outcomes are popped from a FIFO queue. When the queue is empty, a
//! default success reply is returned. Every call is counted and its request
//! recorded, so tests can assert exactly how many remote round-trips
//! happened.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sahayak_core::types::{CoachReply, CoachRequest, RemoteConversation};
use sahayak_core::{CoachApi, SahayakError};

/// A scripted outcome for one coach call.
#[derive(Debug, Clone)]
pub enum CoachOutcome {
    /// Succeed with this assistant reply text.
    Reply(String),
    /// Fail with this HTTP status (`None` = the request never reached the
    /// server).
    Fail(Option<u16>),
}

/// A mock [`CoachApi`] that returns pre-configured outcomes.
pub struct MockCoachApi {
    outcomes: Arc<Mutex<VecDeque<CoachOutcome>>>,
    requests: Arc<Mutex<Vec<CoachRequest>>>,
    calls: AtomicUsize,
}

impl MockCoachApi {
    /// Create a mock with an empty outcome queue (every call succeeds with
    /// the default reply).
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock pre-loaded with successful replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(
                replies.into_iter().map(CoachOutcome::Reply).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful reply.
    pub async fn push_reply(&self, text: impl Into<String>) {
        self.outcomes
            .lock()
            .await
            .push_back(CoachOutcome::Reply(text.into()));
    }

    /// Queue a failure with the given HTTP status (`None` = network error).
    pub async fn push_failure(&self, status: Option<u16>) {
        self.outcomes
            .lock()
            .await
            .push_back(CoachOutcome::Fail(status));
    }

    /// Number of coach calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received, in order.
    pub async fn requests(&self) -> Vec<CoachRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_outcome(&self) -> CoachOutcome {
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| CoachOutcome::Reply("mock coaching reply".to_string()))
    }
}

impl Default for MockCoachApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoachApi for MockCoachApi {
    async fn coach(
        &self,
        _access_token: &str,
        request: &CoachRequest,
    ) -> Result<CoachReply, SahayakError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        match self.next_outcome().await {
            CoachOutcome::Reply(output) => Ok(CoachReply {
                output,
                context_used: None,
            }),
            CoachOutcome::Fail(status) => Err(SahayakError::Api {
                message: "mock failure".to_string(),
                status,
            }),
        }
    }

    async fn list_conversations(
        &self,
        _access_token: &str,
    ) -> Result<Vec<RemoteConversation>, SahayakError> {
        Ok(Vec::new())
    }

    async fn delete_conversation(
        &self,
        _access_token: &str,
        _conversation_id: &str,
    ) -> Result<(), SahayakError> {
        Ok(())
    }

    async fn submit_feedback(
        &self,
        _access_token: &str,
        _conversation_id: &str,
        _worked: bool,
    ) -> Result<(), SahayakError> {
        Ok(())
    }
}
