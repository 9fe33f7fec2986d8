// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort JWT payload inspection.
//!
//! The client never verifies signatures; the token is an opaque bearer
//! credential validated server-side. We only peel the payload open to read
//! the `sub` (teacher id) and `exp` claims, and tolerate any token we cannot
//! parse by returning `None`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Decoded claims of interest. Both fields are optional; an undecodable
/// token yields all-`None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The `sub` claim, our teacher id.
    pub sub: Option<String>,
    /// The `exp` claim converted to epoch milliseconds.
    pub expires_at: Option<i64>,
}

/// Extract `sub` and `exp` from a JWT's payload segment.
pub fn decode_claims(token: &str) -> Claims {
    let Some(payload_b64) = token.split('.').nth(1) else {
        return Claims::default();
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload_b64) else {
        return Claims::default();
    };
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return Claims::default();
    };

    Claims {
        sub: value
            .get("sub")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        // exp is in seconds per RFC 7519.
        expires_at: value
            .get("exp")
            .and_then(|v| v.as_i64())
            .map(|secs| secs * 1000),
    }
}
