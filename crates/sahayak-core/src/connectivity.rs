// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit connectivity state, injected into consumers instead of being
//! read ad hoc from ambient runtime globals.
//!
//! The host platform (browser online/offline events, a network probe, a test
//! harness) drives the state through [`Connectivity::set`]; the Sync Engine
//! and Session Gate observe it through [`Connectivity::is_online`] and
//! [`Connectivity::subscribe`].

use std::sync::Arc;

use tokio::sync::watch;

/// Whether the device currently has a usable network path to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

/// Cloneable handle to the shared connectivity signal.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl Connectivity {
    pub fn new(initial: ConnectivityState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn online() -> Self {
        Self::new(ConnectivityState::Online)
    }

    pub fn offline() -> Self {
        Self::new(ConnectivityState::Offline)
    }

    /// Record a connectivity transition. Subscribers are only woken when the
    /// state actually changes.
    pub fn set(&self, state: ConnectivityState) {
        self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state() == ConnectivityState::Online
    }

    /// Subscribe to transitions. The receiver observes the current state
    /// immediately and every change thereafter.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}
