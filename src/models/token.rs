// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth token file model.

use serde::{Deserialize, Serialize};

/// Strava OAuth tokens as persisted in the token file.
///
/// The token endpoint returns more than we use (athlete profile, token
/// type); those fields are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    /// Bearer token for API calls
    pub access_token: String,
    /// Long-lived token used to obtain a new access token
    pub refresh_token: String,
    /// Access token expiry (unix seconds)
    pub expires_at: i64,
    /// Other fields returned by the token endpoint
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StoredTokens {
    /// Whether the access token expires within `margin_secs` of `now_ts`.
    pub fn expires_within(&self, now_ts: i64, margin_secs: i64) -> bool {
        self.expires_at < now_ts + margin_secs
    }

    /// Merge a token endpoint response into these tokens.
    ///
    /// Strava may rotate the refresh token, so every field of the response
    /// replaces the stored one.
    pub fn apply_refresh(&mut self, response: TokenResponse) {
        self.access_token = response.access_token;
        self.refresh_token = response.refresh_token;
        self.expires_at = response.expires_at;
        self.extra.extend(response.extra);
    }
}

/// Token response from Strava's `/oauth/token` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<TokenResponse> for StoredTokens {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_at,
            extra: response.extra,
        }
    }
}
