// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unsigned test JWTs with a controllable `sub` claim.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Build a structurally valid JWT whose payload carries the given `sub`.
/// The signature is garbage; the client never verifies it.
pub fn make_jwt(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "sub": sub, "exp": 4_102_444_800u64 })
            .to_string()
            .as_bytes(),
    );
    format!("{header}.{payload}.testsig")
}
