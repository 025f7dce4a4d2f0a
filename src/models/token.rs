// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth token exchange response.

use serde::Deserialize;

/// Response body of `POST /oauth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    /// Unix timestamp of issue, sent by some providers.
    #[serde(default)]
    pub created_at: Option<i64>,
}
