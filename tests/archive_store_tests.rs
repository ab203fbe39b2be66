// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::fs;

use strava_stats::services::{Archive, ArchiveStore};

mod common;
use common::make_activity;

#[test]
fn test_missing_file_is_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::new(dir.path().join("nope.json"));

    let archive = store.load();
    assert!(archive.is_empty());
    assert!(archive.year_coverage().is_empty());
}

#[test]
fn test_corrupt_file_is_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activities.json");
    fs::write(&path, "[{\"id\": 1, \"start_date\": ").unwrap();

    let archive = ArchiveStore::new(&path).load();
    assert!(archive.is_empty());
}

#[test]
fn test_wrong_shape_is_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activities.json");
    fs::write(&path, r#"{"activities": []}"#).unwrap();

    assert!(ArchiveStore::new(&path).load().is_empty());
}

#[test]
fn test_duplicate_ids_in_file_collapse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activities.json");
    let records = vec![
        make_activity(1, "2023-01-01T10:00:00Z", "Ride", 1000.0),
        make_activity(1, "2023-01-02T10:00:00Z", "Ride", 2000.0),
        make_activity(2, "2023-01-03T10:00:00Z", "Run", 3000.0),
    ];
    fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

    let archive = ArchiveStore::new(&path).load();
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.records()[0].distance, 1000.0);
}

#[test]
fn test_save_then_load_keeps_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw").join("activities.json");
    let store = ArchiveStore::new(&path);

    let mut record = make_activity(42, "2024-04-01T07:00:00Z", "Ride", 25_000.0);
    record.extra.insert("kudos_count".to_string(), serde_json::json!(7));
    record
        .extra
        .insert("map".to_string(), serde_json::json!({"summary_polyline": "abc"}));
    store.save(&Archive::from_records(vec![record.clone()])).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"kudos_count\": 7"));

    let loaded = store.load();
    assert_eq!(loaded.records(), &[record]);
}

#[test]
fn test_year_only_start_date_counts_as_coverage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activities.json");
    fs::write(&path, r#"[{"id": 7, "start_date": "2020"}]"#).unwrap();

    let archive = ArchiveStore::new(&path).load();
    assert!(archive.has_year(2020));
    assert_eq!(archive.latest_start_in_year(2020), None);
}
