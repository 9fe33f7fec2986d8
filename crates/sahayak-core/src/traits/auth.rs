// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unauthenticated credential endpoints consumed by the Session Gate.

use async_trait::async_trait;

use crate::error::SahayakError;
use crate::types::{OtpChannel, OtpTicket, SignupDetails, TokenPair};

/// Token issuance surface of the remote service.
#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    /// Request a login OTP for an existing teacher.
    async fn request_otp(
        &self,
        channel: OtpChannel,
        destination: &str,
    ) -> Result<OtpTicket, SahayakError>;

    /// Exchange a login OTP for a token pair.
    async fn verify_otp(
        &self,
        channel: OtpChannel,
        destination: &str,
        otp: &str,
    ) -> Result<TokenPair, SahayakError>;

    /// Request a signup OTP, creating a pending teacher record.
    async fn signup_request_otp(
        &self,
        details: &SignupDetails,
    ) -> Result<OtpTicket, SahayakError>;

    /// Exchange a signup OTP for a token pair.
    async fn signup_verify_otp(
        &self,
        phone: &str,
        otp: &str,
    ) -> Result<TokenPair, SahayakError>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SahayakError>;

    /// Invalidate a refresh token server-side.
    async fn logout(&self, refresh_token: &str) -> Result<(), SahayakError>;
}
