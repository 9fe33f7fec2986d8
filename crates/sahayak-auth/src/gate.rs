// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session gate: the only component that reads or writes the cached
//! credential record.
//!
//! Everything here is designed around the offline-first rule: a cached
//! access token is good enough to enter the app, and the network is only
//! consulted when it is actually reachable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sahayak_core::types::{
    AuthSession, OtpChannel, OtpTicket, SignupDetails, TokenPair,
};
use sahayak_core::{AuthApi, Connectivity, SahayakError};
use sahayak_storage::LocalStore;

use crate::jwt;

/// Outcome of [`SessionGate::bootstrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// A usable session exists (possibly a stale-but-cached one when the
    /// backend was unreachable).
    Authenticated(AuthSession),
    /// No usable session. The caller routes to login.
    Unauthenticated,
}

/// Gatekeeper for the singleton auth session.
pub struct SessionGate {
    store: Arc<LocalStore>,
    api: Arc<dyn AuthApi>,
    connectivity: Connectivity,
}

impl SessionGate {
    pub fn new(
        store: Arc<LocalStore>,
        api: Arc<dyn AuthApi>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            store,
            api,
            connectivity,
        }
    }

    /// Establish the session state at startup.
    ///
    /// Offline with a cached token: authenticated, zero network calls.
    /// Online with a refresh token: one refresh round-trip. A rejected
    /// refresh means the credential is dead and the session is cleared; a
    /// transport failure while nominally online degrades to the cached
    /// token. Nothing cached: unauthenticated.
    pub async fn bootstrap(&self) -> Result<Bootstrap, SahayakError> {
        let Some(cached) = self.store.session().await? else {
            debug!("bootstrap: no cached session");
            return Ok(Bootstrap::Unauthenticated);
        };

        if !self.connectivity.is_online() {
            info!("bootstrap: offline, using cached session");
            return Ok(Bootstrap::Authenticated(cached));
        }

        match self.api.refresh(&cached.refresh_token).await {
            Ok(pair) => {
                let session = self.persist_tokens(pair).await?;
                info!("bootstrap: session refreshed");
                Ok(Bootstrap::Authenticated(session))
            }
            Err(e) if e.is_transient() => {
                // Reachability flapped under us; the cached token may still
                // be honored when the request finally lands.
                warn!(error = %e, "bootstrap: refresh unreachable, degrading to cached session");
                Ok(Bootstrap::Authenticated(cached))
            }
            Err(e) => {
                warn!(error = %e, "bootstrap: refresh rejected, clearing session");
                self.store.clear_session().await?;
                Ok(Bootstrap::Unauthenticated)
            }
        }
    }

    /// Request a login OTP for an existing teacher.
    pub async fn request_otp(
        &self,
        channel: OtpChannel,
        destination: &str,
    ) -> Result<OtpTicket, SahayakError> {
        validate_destination(destination)?;
        self.api.request_otp(channel, destination).await
    }

    /// Exchange a login OTP for a persisted session.
    pub async fn verify_otp(
        &self,
        channel: OtpChannel,
        destination: &str,
        otp: &str,
    ) -> Result<AuthSession, SahayakError> {
        validate_destination(destination)?;
        validate_otp(otp)?;
        let pair = self.api.verify_otp(channel, destination, otp).await?;
        self.persist_tokens(pair).await
    }

    /// Request a signup OTP, creating a pending teacher record remotely.
    pub async fn signup_request_otp(
        &self,
        details: &SignupDetails,
    ) -> Result<OtpTicket, SahayakError> {
        if details.name.trim().is_empty() {
            return Err(SahayakError::Validation("name must not be empty".into()));
        }
        validate_destination(&details.phone)?;
        self.api.signup_request_otp(details).await
    }

    /// Complete signup: exchange the OTP for a persisted session.
    pub async fn signup_verify_otp(
        &self,
        phone: &str,
        otp: &str,
    ) -> Result<AuthSession, SahayakError> {
        validate_destination(phone)?;
        validate_otp(otp)?;
        let pair = self.api.signup_verify_otp(phone, otp).await?;
        self.persist_tokens(pair).await
    }

    /// Invalidate the session. The remote call is best effort and skipped
    /// offline; the local clear is unconditional.
    pub async fn logout(&self) -> Result<(), SahayakError> {
        if let Some(session) = self.store.session().await? {
            if self.connectivity.is_online() {
                if let Err(e) = self.api.logout(&session.refresh_token).await {
                    warn!(error = %e, "remote logout failed, clearing local session anyway");
                }
            }
        }
        self.store.clear_session().await?;
        info!("session cleared");
        Ok(())
    }

    /// The current access token, for the Sync Engine's bearer header.
    pub async fn access_token(&self) -> Result<String, SahayakError> {
        match self.store.session().await? {
            Some(session) => Ok(session.access_token),
            None => Err(SahayakError::Auth("no cached session".into())),
        }
    }

    /// The teacher id of the current session, when known.
    pub async fn teacher_id(&self) -> Result<Option<String>, SahayakError> {
        Ok(self.store.session().await?.and_then(|s| s.teacher_id))
    }

    /// React to a 401 from an authenticated call: the credential is dead,
    /// drop it so the caller can route to login. Queued actions and chat
    /// history are untouched.
    pub async fn handle_unauthorized(&self) -> Result<(), SahayakError> {
        warn!("bearer token rejected, clearing session");
        self.store.clear_session().await
    }

    async fn persist_tokens(&self, pair: TokenPair) -> Result<AuthSession, SahayakError> {
        let claims = jwt::decode_claims(&pair.access_token);
        let session = AuthSession {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            teacher_id: claims.sub,
            expires_at: claims.expires_at,
        };
        self.store.save_session(&session).await?;
        Ok(session)
    }
}

fn validate_destination(destination: &str) -> Result<(), SahayakError> {
    if destination.trim().is_empty() {
        return Err(SahayakError::Validation(
            "destination must not be empty".into(),
        ));
    }
    Ok(())
}

fn validate_otp(otp: &str) -> Result<(), SahayakError> {
    if otp.len() != 6 || !otp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SahayakError::Validation("OTP must be 6 digits".into()));
    }
    Ok(())
}
