// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the remote coaching service.
//!
//! Provides [`HttpApiClient`], which implements [`CoachApi`] and [`AuthApi`]
//! over reqwest. Non-2xx responses are mapped to [`SahayakError::Api`] with
//! the server's `detail` message when the body carries one; requests that
//! never produce a response map to `status: None` so the Sync Engine can
//! classify them as transient.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use sahayak_core::types::{
    CoachReply, CoachRequest, OtpChannel, OtpTicket, RemoteConversation, SignupDetails,
    TokenPair,
};
use sahayak_core::{AuthApi, CoachApi, SahayakError};

use crate::types::{
    ErrorBody, FeedbackIn, LogoutIn, RefreshIn, RequestOtpIn, SignupVerifyOtpIn, VerifyOtpIn,
};

/// Default per-request timeout. Expiry is a retryable failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the coaching backend.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpApiClient {
    /// Creates a new API client against `base_url` with the given timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SahayakError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SahayakError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Creates a client with the default 30s timeout.
    pub fn with_default_timeout(base_url: impl Into<String>) -> Result<Self, SahayakError> {
        Self::new(base_url, DEFAULT_TIMEOUT)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> SahayakError {
        if e.is_timeout() {
            SahayakError::Timeout {
                duration: self.timeout,
            }
        } else {
            SahayakError::Api {
                message: format!("request failed: {e}"),
                status: None,
            }
        }
    }

    /// Send a request and decode the JSON response, mapping failures into
    /// the workspace error taxonomy.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SahayakError> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        debug!(status = %status, "response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(SahayakError::Api {
                message,
                status: Some(status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| SahayakError::Api {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
        })?;
        serde_json::from_str(&body).map_err(|e| SahayakError::Api {
            message: format!("failed to parse response: {e}"),
            status: Some(status.as_u16()),
        })
    }

    /// Like [`execute`], but discards the response body.
    async fn execute_unit(&self, request: reqwest::RequestBuilder) -> Result<(), SahayakError> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        debug!(status = %status, "response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(SahayakError::Api {
                message,
                status: Some(status.as_u16()),
            });
        }
        Ok(())
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).json(body)
    }

    fn bearer(request: reqwest::RequestBuilder, access_token: &str) -> reqwest::RequestBuilder {
        request.bearer_auth(access_token)
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn request_otp(
        &self,
        channel: OtpChannel,
        destination: &str,
    ) -> Result<OtpTicket, SahayakError> {
        self.execute(self.post_json(
            "/auth/request-otp",
            &RequestOtpIn {
                channel,
                destination,
            },
        ))
        .await
    }

    async fn verify_otp(
        &self,
        channel: OtpChannel,
        destination: &str,
        otp: &str,
    ) -> Result<TokenPair, SahayakError> {
        self.execute(self.post_json(
            "/auth/verify-otp",
            &VerifyOtpIn {
                channel,
                destination,
                otp,
            },
        ))
        .await
    }

    async fn signup_request_otp(
        &self,
        details: &SignupDetails,
    ) -> Result<OtpTicket, SahayakError> {
        self.execute(self.post_json("/auth/signup/request-otp", details))
            .await
    }

    async fn signup_verify_otp(
        &self,
        phone: &str,
        otp: &str,
    ) -> Result<TokenPair, SahayakError> {
        self.execute(self.post_json(
            "/auth/signup/verify-otp",
            &SignupVerifyOtpIn { phone, otp },
        ))
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SahayakError> {
        self.execute(self.post_json("/auth/refresh", &RefreshIn { refresh_token }))
            .await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), SahayakError> {
        self.execute_unit(self.post_json("/auth/logout", &LogoutIn { refresh_token }))
            .await
    }
}

#[async_trait]
impl CoachApi for HttpApiClient {
    async fn coach(
        &self,
        access_token: &str,
        request: &CoachRequest,
    ) -> Result<CoachReply, SahayakError> {
        self.execute(Self::bearer(
            self.post_json("/api/coach", request),
            access_token,
        ))
        .await
    }

    async fn list_conversations(
        &self,
        access_token: &str,
    ) -> Result<Vec<RemoteConversation>, SahayakError> {
        self.execute(Self::bearer(
            self.client.get(self.url("/api/conversations")),
            access_token,
        ))
        .await
    }

    async fn delete_conversation(
        &self,
        access_token: &str,
        conversation_id: &str,
    ) -> Result<(), SahayakError> {
        self.execute_unit(Self::bearer(
            self.client
                .delete(self.url(&format!("/api/conversations/{conversation_id}"))),
            access_token,
        ))
        .await
    }

    async fn submit_feedback(
        &self,
        access_token: &str,
        conversation_id: &str,
        worked: bool,
    ) -> Result<(), SahayakError> {
        self.execute_unit(Self::bearer(
            self.post_json(
                &format!("/api/conversations/{conversation_id}/feedback"),
                &FeedbackIn { worked },
            ),
            access_token,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> HttpApiClient {
        HttpApiClient::new(base_url, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn coach_call_carries_bearer_and_parses_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/coach"))
            .and(header("authorization", "Bearer token-1"))
            .and(body_partial_json(json!({"prompt": "help me"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": "Try group work.",
                "context_used": {"grade": 6}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client
            .coach(
                "token-1",
                &CoachRequest {
                    prompt: "help me".into(),
                    grade: Some(6),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reply.output, "Try group work.");
        assert!(reply.context_used.is_some());
    }

    #[tokio::test]
    async fn error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid OTP"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .verify_otp(OtpChannel::Phone, "+911234567890", "000000")
            .await
            .unwrap_err();
        match err {
            SahayakError::Api { message, status } => {
                assert_eq!(message, "Invalid OTP");
                assert_eq!(status, Some(400));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_detail_yields_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.refresh("refresh-1").await.unwrap_err();
        match err {
            SahayakError::Api { message, status } => {
                assert_eq!(message, "request failed");
                assert_eq!(status, Some(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_transient_error() {
        // Nothing listens on this port.
        let client = test_client("http://127.0.0.1:1");
        let err = client.refresh("refresh-1").await.unwrap_err();
        assert!(err.is_transient(), "connection failure must be transient");
        assert!(matches!(err, SahayakError::Api { status: None, .. }));
    }

    #[tokio::test]
    async fn verify_otp_returns_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .and(body_partial_json(
                json!({"channel": "phone", "destination": "+911234567890", "otp": "123456"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let pair = client
            .verify_otp(OtpChannel::Phone, "+911234567890", "123456")
            .await
            .unwrap();
        assert_eq!(pair.access_token, "access-1");
        assert_eq!(pair.refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn conversation_listing_and_feedback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/conversations"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "c1",
                "title": "Fractions",
                "last_message_preview": "Use visual aids",
                "updated_at": "2026-01-01T00:00:00Z",
                "worked": null
            }])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/conversations/c1/feedback"))
            .and(body_partial_json(json!({"worked": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let conversations = client.list_conversations("token-1").await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, "c1");

        client
            .submit_feedback("token-1", "c1", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()));
        client.logout("refresh-1").await.unwrap();
    }
}
