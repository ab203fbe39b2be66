// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Built once at startup and passed down explicitly; nothing else in the
//! crate reads the environment.

use std::env;
use std::path::PathBuf;

use crate::services::classify::TagRule;
use crate::time_utils;

/// Default page size for activity listing (Strava maximum).
pub const DEFAULT_PER_PAGE: u32 = 200;

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default tag rules applied to activity names.
pub const DEFAULT_CATEGORY_TAGS: &str = "SBEQ=Ride,HEQ=Hiking,GEQ=Gardening";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Secrets ---
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,

    // --- Files and directories ---
    /// OAuth token file (access/refresh token pair)
    pub token_file: PathBuf,
    /// Activity archive (JSON array of activities)
    pub activities_file: PathBuf,
    /// Summary statistics output (JSON)
    pub summaries_file: PathBuf,
    /// Rendered table images
    pub images_dir: PathBuf,

    // --- Run settings ---
    /// Years to report on, in the order given
    pub years: Vec<i32>,
    /// Page size for activity listing
    pub per_page: u32,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
    /// Name tag rules for activity classification
    pub category_tags: Vec<TagRule>,
    /// Log line format
    pub log_format: LogFormat,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            token_file: data_dir.join("strava_tokens.json"),
            activities_file: data_dir.join("raw").join("my_strava_activities.json"),
            summaries_file: data_dir.join("processed").join("strava_summaries.json"),
            images_dir: data_dir.join("images"),
            years: vec![2025],
            per_page: DEFAULT_PER_PAGE,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            category_tags: TagRule::parse_list(DEFAULT_CATEGORY_TAGS).unwrap_or_default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `.local.env` is loaded first, then `.env`; variables already set in
    /// the process environment win over both.
    pub fn from_env(current_year: i32) -> Result<Self, ConfigError> {
        dotenvy::from_filename(".local.env").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok(), current_year)
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// `current_year` is the fallback when `STRAVA_YEARS` is not set.
    pub fn from_lookup<F>(lookup: F, current_year: i32) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = PathBuf::from(non_empty("STRAVA_DATA_DIR").unwrap_or_else(|| "data".into()));
        let path_or = |key: &str, fallback: PathBuf| non_empty(key).map(PathBuf::from).unwrap_or(fallback);

        let years = match non_empty("STRAVA_YEARS") {
            Some(raw) => parse_years(&raw)?,
            None => vec![current_year],
        };

        let per_page = match non_empty("STRAVA_PER_PAGE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=DEFAULT_PER_PAGE).contains(n))
                .ok_or(ConfigError::Invalid("STRAVA_PER_PAGE", raw))?,
            None => DEFAULT_PER_PAGE,
        };

        let http_timeout_secs = non_empty("STRAVA_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let tags_raw =
            non_empty("STRAVA_CATEGORY_TAGS").unwrap_or_else(|| DEFAULT_CATEGORY_TAGS.to_string());
        let category_tags = TagRule::parse_list(&tags_raw)
            .map_err(|_| ConfigError::Invalid("STRAVA_CATEGORY_TAGS", tags_raw.clone()))?;

        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            strava_client_id: non_empty("STRAVA_CLIENT_ID")
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: non_empty("STRAVA_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            token_file: path_or("STRAVA_TOKEN_FILE", data_dir.join("strava_tokens.json")),
            activities_file: path_or(
                "STRAVA_ACTIVITIES_FILE",
                data_dir.join("raw").join("my_strava_activities.json"),
            ),
            summaries_file: path_or(
                "STRAVA_SUMMARIES_FILE",
                data_dir.join("processed").join("strava_summaries.json"),
            ),
            images_dir: path_or("STRAVA_IMAGES_DIR", data_dir.join("images")),
            years,
            per_page,
            http_timeout_secs,
            category_tags,
            log_format,
        })
    }
}

/// Parse `STRAVA_YEARS`: see [`parse_year_list`].
pub fn parse_years(raw: &str) -> Result<Vec<i32>, ConfigError> {
    parse_year_list("STRAVA_YEARS", raw)
}

/// Parse a comma-separated year list, dropping duplicates but keeping order.
///
/// Every year must be positive and have a representable
/// `[Jan 1 year, Jan 1 year+1)` UTC range. `source` names the setting in
/// errors.
pub fn parse_year_list(source: &'static str, raw: &str) -> Result<Vec<i32>, ConfigError> {
    let mut years: Vec<i32> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let year = part
            .parse::<i32>()
            .ok()
            .filter(|y| *y > 0 && time_utils::year_bounds(*y).is_some())
            .ok_or_else(|| ConfigError::Invalid(source, part.to_string()))?;
        if !years.contains(&year) {
            years.push(year);
        }
    }

    if years.is_empty() {
        return Err(ConfigError::Invalid(source, raw.to_string()));
    }
    Ok(years)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let lookup = lookup_from(&[
            ("STRAVA_CLIENT_ID", "test_id"),
            ("STRAVA_CLIENT_SECRET", " test_secret "),
        ]);

        let config = Config::from_lookup(lookup, 2025).expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.years, vec![2025]);
        assert_eq!(config.per_page, 200);
        assert_eq!(config.token_file, PathBuf::from("data/strava_tokens.json"));
        assert_eq!(
            config.activities_file,
            PathBuf::from("data/raw/my_strava_activities.json")
        );
        assert_eq!(config.category_tags.len(), 3);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_missing_secret() {
        let lookup = lookup_from(&[("STRAVA_CLIENT_ID", "test_id")]);

        let err = Config::from_lookup(lookup, 2025).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("STRAVA_CLIENT_SECRET")));
    }

    #[test]
    fn test_config_overrides() {
        let lookup = lookup_from(&[
            ("STRAVA_CLIENT_ID", "id"),
            ("STRAVA_CLIENT_SECRET", "secret"),
            ("STRAVA_DATA_DIR", "/var/strava"),
            ("STRAVA_YEARS", "2024, 2023,2024"),
            ("STRAVA_PER_PAGE", "50"),
            ("LOG_FORMAT", "json"),
        ]);

        let config = Config::from_lookup(lookup, 2025).unwrap();

        assert_eq!(config.years, vec![2024, 2023]);
        assert_eq!(config.per_page, 50);
        assert_eq!(
            config.token_file,
            PathBuf::from("/var/strava/strava_tokens.json")
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_parse_years_rejects_garbage() {
        assert!(parse_years("2024,abc").is_err());
        assert!(parse_years(" , ").is_err());
        assert!(parse_years("-1").is_err());
        assert!(parse_years("0").is_err());
    }

    #[test]
    fn test_parse_years_rejects_unrepresentable() {
        assert!(parse_years("2024,300000").is_err());
        assert!(parse_years("2147483647").is_err());
        assert!(matches!(
            parse_year_list("--years", "2147483647"),
            Err(ConfigError::Invalid("--years", _))
        ));
    }

    #[test]
    fn test_per_page_out_of_range() {
        let lookup = lookup_from(&[
            ("STRAVA_CLIENT_ID", "id"),
            ("STRAVA_CLIENT_SECRET", "secret"),
            ("STRAVA_PER_PAGE", "500"),
        ]);

        assert!(Config::from_lookup(lookup, 2025).is_err());
    }
}
