// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types private to the HTTP client. Response types shared with the
//! rest of the workspace live in `sahayak-core::types`.

use serde::{Deserialize, Serialize};

use sahayak_core::types::OtpChannel;

/// Error body shape used by the backend for all failure responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RequestOtpIn<'a> {
    pub channel: OtpChannel,
    pub destination: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpIn<'a> {
    pub channel: OtpChannel,
    pub destination: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignupVerifyOtpIn<'a> {
    pub phone: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshIn<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LogoutIn<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct FeedbackIn {
    pub worked: bool,
}
