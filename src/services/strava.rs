// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Activity listing by time range (paginated)
//! - Athlete gear and single gear lookups
//! - Token refresh and authorization code exchange
//! - Rate limit / bad token detection

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, StoredTokens, TokenResponse};
use crate::services::fetch::ActivitySource;
use crate::services::gear::{GearMap, GearSource};
use crate::services::tokens::{TokenRefresher, TokenStore};

const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const STRAVA_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Setup(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: STRAVA_API_BASE.to_string(),
            client_id,
            client_secret,
        })
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Browser URL the athlete visits to grant read access.
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&approval_prompt=force&scope={}",
            STRAVA_AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("activity:read_all,profile:read_all"),
        )
    }

    /// List activities in `(after, before)` (paginated).
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Get authenticated athlete profile (with active gear).
    pub async fn get_athlete(&self, access_token: &str) -> Result<StravaAthlete> {
        let url = format!("{}/athlete", self.base_url);
        self.get_json(&url, access_token).await
    }

    /// Get a single gear item by ID.
    pub async fn get_gear(&self, access_token: &str, gear_id: &str) -> Result<StravaGear> {
        let url = format!("{}/gear/{}", self.base_url, urlencoding::encode(gear_id));
        self.get_json(&url, access_token).await
    }

    /// Exchange an authorization code for the first token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(STRAVA_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token exchange failed: {}", e)))?;

        self.check_response_json(response)
            .await
            .map_err(|e| AppError::Auth(format!("Token exchange failed: {}", e)))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl TokenRefresher for StravaClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(STRAVA_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }
}

/// Athlete profile subset carrying active gear.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub bikes: Vec<StravaGear>,
    #[serde(default)]
    pub shoes: Vec<StravaGear>,
}

impl StravaAthlete {
    /// Map of gear ID to name for all bikes and shoes.
    pub fn gear_map(&self) -> GearMap {
        self.bikes
            .iter()
            .chain(self.shoes.iter())
            .map(|g| (g.id.clone(), g.display_name()))
            .collect::<HashMap<_, _>>()
    }
}

/// Gear summary (bike or shoe).
#[derive(Debug, Clone, Deserialize)]
pub struct StravaGear {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl StravaGear {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| crate::services::gear::UNKNOWN_GEAR_NAME.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - client bound to a valid access token
// ─────────────────────────────────────────────────────────────────────────────

/// Strava client bound to an access token that was valid at startup.
///
/// Obtaining the token is the only step that may refresh credentials; a
/// failure there aborts the run before anything is fetched.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    access_token: String,
}

impl StravaService {
    /// Obtain a valid access token from `tokens` (refreshing if needed).
    pub async fn connect(client: StravaClient, tokens: &TokenStore) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let access_token = tokens.valid_access_token(&client, now).await?;
        Ok(Self {
            client,
            access_token,
        })
    }
}

#[async_trait]
impl ActivitySource for StravaService {
    async fn list_activities(
        &self,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>> {
        self.client
            .list_activities(&self.access_token, after, before, page, per_page)
            .await
    }
}

#[async_trait]
impl GearSource for StravaService {
    async fn active_gear(&self) -> Result<GearMap> {
        let athlete = self.client.get_athlete(&self.access_token).await?;
        Ok(athlete.gear_map())
    }

    async fn gear_name(&self, gear_id: &str) -> Result<String> {
        let gear = self.client.get_gear(&self.access_token, gear_id).await?;
        Ok(gear.display_name())
    }
}

/// Run the first-time authorization code exchange and store the tokens.
pub async fn exchange_and_store(
    client: &StravaClient,
    store: &TokenStore,
    code: &str,
) -> Result<StoredTokens> {
    let response = client.exchange_code(code.trim()).await?;
    let tokens = StoredTokens::from(response);
    store.save(&tokens)?;
    tracing::info!(path = %store.path().display(), "Tokens saved");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_scope() {
        let client = StravaClient::new(
            "12345".to_string(),
            "secret".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        let url = client.authorize_url("http://localhost/exchange_token");
        assert!(url.starts_with("https://www.strava.com/oauth/authorize?client_id=12345"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%2Fexchange_token"));
        assert!(url.contains("scope=activity%3Aread_all%2Cprofile%3Aread_all"));
        assert!(!url.contains("secret"));
    }

    #[test]
    fn test_athlete_gear_map() {
        let athlete: StravaAthlete = serde_json::from_str(
            r#"{
                "id": 1,
                "bikes": [{"id": "b1", "name": "Road Bike"}],
                "shoes": [{"id": "g2", "name": "Trail Shoes"}, {"id": "g3"}]
            }"#,
        )
        .unwrap();

        let map = athlete.gear_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["b1"], "Road Bike");
        assert_eq!(map["g2"], "Trail Shoes");
        assert_eq!(map["g3"], "Unknown Name");
    }

    #[test]
    fn test_athlete_without_gear() {
        let athlete: StravaAthlete = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert!(athlete.gear_map().is_empty());
    }
}
