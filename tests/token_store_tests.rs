// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::fs;

use strava_stats::error::AppError;
use strava_stats::models::StoredTokens;
use strava_stats::services::TokenStore;

mod common;
use common::FakeRefresher;

const NOW: i64 = 1_718_452_800;

fn write_tokens(store: &TokenStore, expires_at: i64) {
    let mut extra = serde_json::Map::new();
    extra.insert("token_type".to_string(), serde_json::json!("Bearer"));
    store
        .save(&StoredTokens {
            access_token: "old-access".to_string(),
            refresh_token: "old-refresh".to_string(),
            expires_at,
            extra,
        })
        .unwrap();
}

#[tokio::test]
async fn test_valid_token_not_refreshed() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("tokens.json"));
    write_tokens(&store, NOW + 3600);
    let refresher = FakeRefresher::succeeding("new", "new-refresh", NOW + 7200);

    let token = store.valid_access_token(&refresher, NOW).await.unwrap();

    assert_eq!(token, "old-access");
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn test_expiring_token_refreshed_and_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("tokens.json"));
    // Inside the five minute margin.
    write_tokens(&store, NOW + 120);
    let refresher = FakeRefresher::succeeding("new-access", "new-refresh", NOW + 21_600);

    let token = store.valid_access_token(&refresher, NOW).await.unwrap();

    assert_eq!(token, "new-access");
    assert_eq!(refresher.calls(), 1);

    let saved = store.load().unwrap();
    assert_eq!(saved.access_token, "new-access");
    assert_eq!(saved.refresh_token, "new-refresh");
    assert_eq!(saved.expires_at, NOW + 21_600);
    assert_eq!(saved.extra.get("token_type"), Some(&serde_json::json!("Bearer")));
}

#[tokio::test]
async fn test_refresh_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    let store = TokenStore::new(&path);
    write_tokens(&store, NOW - 10);
    let before = fs::read_to_string(&path).unwrap();

    let err = store
        .valid_access_token(&FakeRefresher::failing(), NOW)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(_)));
    assert!(err.is_fatal());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_missing_token_file_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("missing.json"));
    let refresher = FakeRefresher::succeeding("a", "b", NOW + 3600);

    let err = store.valid_access_token(&refresher, NOW).await.unwrap_err();

    assert!(matches!(err, AppError::Setup(_)));
    assert!(err.to_string().contains("auth"));
    assert_eq!(refresher.calls(), 0);
}

#[test]
fn test_malformed_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    fs::write(&path, r#"{"access_token": "x"}"#).unwrap();

    let err = TokenStore::new(&path).load().unwrap_err();
    assert!(matches!(err, AppError::Setup(_)));
}
