// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token file management and refresh-on-expiry.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{StoredTokens, TokenResponse};
use crate::services::archive::write_atomic;

/// Margin before token expiration when we proactively refresh (5 minutes).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Something that can trade a refresh token for a new token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse>;
}

/// OAuth tokens persisted as JSON on disk.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token file.
    ///
    /// A missing file means the one-time authorization was never done.
    pub fn load(&self) -> Result<StoredTokens> {
        if !self.path.exists() {
            return Err(AppError::Setup(format!(
                "'{}' not found. Run the `auth` command first.",
                self.path.display()
            )));
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| AppError::io(&self.path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Setup(format!("'{}' is not a valid token file: {}", self.path.display(), e))
        })
    }

    pub fn save(&self, tokens: &StoredTokens) -> Result<()> {
        let json = serde_json::to_string_pretty(tokens)?;
        write_atomic(&self.path, json.as_bytes())
    }

    /// Get a valid (non-expiring) access token.
    ///
    /// Refreshes through `refresher` when the stored token expires within
    /// five minutes of `now_ts`, and persists the new tokens. Any refresh
    /// failure is an authentication error.
    pub async fn valid_access_token<R>(&self, refresher: &R, now_ts: i64) -> Result<String>
    where
        R: TokenRefresher + ?Sized,
    {
        let mut tokens = self.load()?;

        if !tokens.expires_within(now_ts, TOKEN_REFRESH_MARGIN_SECS) {
            tracing::debug!(expires_at = tokens.expires_at, "Access token still valid");
            return Ok(tokens.access_token);
        }

        tracing::info!(expires_at = tokens.expires_at, "Access token expired, refreshing");

        let response = refresher
            .refresh(&tokens.refresh_token)
            .await
            .map_err(|e| AppError::Auth(format!("Error refreshing token: {}", e)))?;
        tokens.apply_refresh(response);
        self.save(&tokens)?;

        tracing::info!(expires_at = tokens.expires_at, "Token refreshed and saved");
        Ok(tokens.access_token)
    }
}
