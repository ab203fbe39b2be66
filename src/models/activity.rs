// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for the archive and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils;

/// One activity as returned by `GET /athlete/activities` and stored in the
/// archive.
///
/// Fields the pipeline does not use are kept in `extra` so the archive
/// round-trips the API payload unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Strava activity ID (archive primary key)
    pub id: u64,
    /// Activity name/title
    #[serde(default)]
    pub name: String,
    /// Sport type (Ride, Swim, AlpineSki, etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_type: Option<String>,
    /// Legacy activity type, used when `sport_type` is missing
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    /// Start date/time (ISO 8601, UTC)
    pub start_date: String,
    /// Start date/time in the athlete's local zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_local: Option<String>,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Elevation gain in meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Gear (bike/shoe) ID
    #[serde(default)]
    pub gear_id: Option<String>,
    /// Everything else the API returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ActivityRecord {
    /// Calendar year of `start_date`.
    pub fn year(&self) -> Option<i32> {
        time_utils::year_of(&self.start_date)
    }

    /// Parsed `start_date`, if well formed.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        time_utils::parse_utc(&self.start_date)
    }

    /// Sport type with the legacy `type` as fallback.
    pub fn sport(&self) -> &str {
        self.sport_type
            .as_deref()
            .or(self.activity_type.as_deref())
            .unwrap_or("Unknown")
    }

    /// Date used for "active day" counting: local date when known.
    pub fn activity_date(&self) -> Option<chrono::NaiveDate> {
        self.start_date_local
            .as_deref()
            .and_then(time_utils::date_of)
            .or_else(|| time_utils::date_of(&self.start_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_payload_keeps_extra_fields() {
        let raw = r#"{
            "id": 12345,
            "name": "Morning Ride",
            "sport_type": "Ride",
            "type": "Ride",
            "start_date": "2024-01-15T10:30:00Z",
            "start_date_local": "2024-01-15T02:30:00Z",
            "distance": 20123.4,
            "total_elevation_gain": 310.0,
            "gear_id": "b123",
            "kudos_count": 7,
            "map": {"summary_polyline": "abc"}
        }"#;

        let activity: ActivityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.id, 12345);
        assert_eq!(activity.sport(), "Ride");
        assert_eq!(activity.year(), Some(2024));
        assert_eq!(activity.gear_id.as_deref(), Some("b123"));
        assert_eq!(activity.extra.get("kudos_count"), Some(&serde_json::json!(7)));

        let back = serde_json::to_value(&activity).unwrap();
        assert_eq!(back["map"]["summary_polyline"], "abc");
        assert_eq!(back["type"], "Ride");
    }

    #[test]
    fn test_missing_optional_fields() {
        let raw = r#"{"id": 1, "start_date": "2023-05-01T00:00:00Z", "gear_id": null}"#;

        let activity: ActivityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.sport(), "Unknown");
        assert_eq!(activity.distance, 0.0);
        assert!(activity.gear_id.is_none());
    }

    #[test]
    fn test_sport_falls_back_to_type() {
        let raw = r#"{"id": 2, "type": "Swim", "start_date": "2023-05-01T00:00:00Z"}"#;

        let activity: ActivityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.sport(), "Swim");
    }

    #[test]
    fn test_activity_date_prefers_local() {
        let raw = r#"{
            "id": 3,
            "start_date": "2024-01-01T03:00:00Z",
            "start_date_local": "2023-12-31T19:00:00Z"
        }"#;

        let activity: ActivityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(
            activity.activity_date(),
            chrono::NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(activity.year(), Some(2024));
    }
}
