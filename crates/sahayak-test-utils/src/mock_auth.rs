// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock auth API for testing the session gate without a server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sahayak_core::types::{OtpChannel, OtpTicket, SignupDetails, TokenPair};
use sahayak_core::{AuthApi, SahayakError};

use crate::jwt::make_jwt;

/// How the mock responds to `refresh` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshBehavior {
    /// Return a fresh token pair for the configured teacher.
    Succeed,
    /// Reject with 401, as the server does for a revoked refresh token.
    Reject,
    /// Fail as if the request never reached the server.
    NetworkError,
}

/// A mock [`AuthApi`] backed by a single configured teacher identity.
///
/// Any OTP other than [`valid_otp`](Self::valid_otp) is rejected with 400.
/// Call counters let tests assert that an operation made zero network
/// round-trips.
pub struct MockAuthApi {
    teacher_id: String,
    valid_otp: String,
    refresh_behavior: Mutex<RefreshBehavior>,
    refresh_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl MockAuthApi {
    pub fn new(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            valid_otp: "123456".to_string(),
            refresh_behavior: Mutex::new(RefreshBehavior::Succeed),
            refresh_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    /// The OTP this mock accepts. Defaults to `"123456"`.
    pub fn valid_otp(&self) -> &str {
        &self.valid_otp
    }

    pub fn set_refresh_behavior(&self, behavior: RefreshBehavior) {
        *self.refresh_behavior.lock().unwrap() = behavior;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    fn token_pair(&self) -> TokenPair {
        TokenPair {
            access_token: make_jwt(&self.teacher_id),
            refresh_token: format!("refresh-{}", self.teacher_id),
        }
    }

    fn check_otp(&self, otp: &str) -> Result<(), SahayakError> {
        if otp == self.valid_otp {
            Ok(())
        } else {
            Err(SahayakError::Api {
                message: "Invalid OTP".to_string(),
                status: Some(400),
            })
        }
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn request_otp(
        &self,
        _channel: OtpChannel,
        _destination: &str,
    ) -> Result<OtpTicket, SahayakError> {
        Ok(OtpTicket {
            ok: true,
            dev_otp: Some(self.valid_otp.clone()),
            teacher_id: Some(self.teacher_id.clone()),
        })
    }

    async fn verify_otp(
        &self,
        _channel: OtpChannel,
        _destination: &str,
        otp: &str,
    ) -> Result<TokenPair, SahayakError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.check_otp(otp)?;
        Ok(self.token_pair())
    }

    async fn signup_request_otp(
        &self,
        _details: &SignupDetails,
    ) -> Result<OtpTicket, SahayakError> {
        Ok(OtpTicket {
            ok: true,
            dev_otp: Some(self.valid_otp.clone()),
            teacher_id: Some(self.teacher_id.clone()),
        })
    }

    async fn signup_verify_otp(
        &self,
        _phone: &str,
        otp: &str,
    ) -> Result<TokenPair, SahayakError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.check_otp(otp)?;
        Ok(self.token_pair())
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, SahayakError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match *self.refresh_behavior.lock().unwrap() {
            RefreshBehavior::Succeed => Ok(self.token_pair()),
            RefreshBehavior::Reject => Err(SahayakError::Api {
                message: "Invalid refresh token".to_string(),
                status: Some(401),
            }),
            RefreshBehavior::NetworkError => Err(SahayakError::Api {
                message: "connection refused".to_string(),
                status: None,
            }),
        }
    }

    async fn logout(&self, _refresh_token: &str) -> Result<(), SahayakError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
