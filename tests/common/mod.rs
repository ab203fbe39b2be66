// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use strava_stats::error::{AppError, Result};
use strava_stats::models::{ActivityRecord, TokenResponse};
use strava_stats::services::{ActivitySource, GearMap, GearSource, TokenRefresher};

/// Build an activity with the fields the pipeline reads.
#[allow(dead_code)]
pub fn make_activity(id: u64, start_date: &str, sport: &str, distance: f64) -> ActivityRecord {
    ActivityRecord {
        id,
        name: format!("{} {}", sport, id),
        sport_type: Some(sport.to_string()),
        activity_type: None,
        start_date: start_date.to_string(),
        start_date_local: None,
        distance,
        total_elevation_gain: 0.0,
        gear_id: None,
        extra: serde_json::Map::new(),
    }
}

/// Fixed "now" for reconciliation tests: mid-2024.
#[allow(dead_code)]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// One `list_activities` call: (after, before, page, per_page).
pub type Call = (i64, i64, u32, u32);

/// In-memory activity source that records every call.
///
/// `after` is treated as inclusive so the newest archived activity comes
/// back again on incremental syncs; `before` is exclusive.
#[derive(Default)]
pub struct FakeSource {
    remote: Vec<ActivityRecord>,
    calls: Mutex<Vec<Call>>,
    fail_page: Option<u32>,
    fail_message: Option<String>,
    gear: GearMap,
    gear_names: HashMap<String, String>,
    failing_gear: HashSet<String>,
    gear_lookups: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn new(remote: Vec<ActivityRecord>) -> Self {
        Self {
            remote,
            ..Default::default()
        }
    }

    /// Fail every request for `page`.
    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.fail_page = Some(page);
        self
    }

    /// Fail every request for `page` with a `StravaApi` error carrying `message`.
    pub fn failing_with(mut self, page: u32, message: &str) -> Self {
        self.fail_page = Some(page);
        self.fail_message = Some(message.to_string());
        self
    }

    /// Gear returned by the athlete profile.
    pub fn with_active_gear(mut self, id: &str, name: &str) -> Self {
        self.gear.insert(id.to_string(), name.to_string());
        self
    }

    /// Gear only reachable through a per-ID lookup.
    pub fn with_retired_gear(mut self, id: &str, name: &str) -> Self {
        self.gear_names.insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_failing_gear(mut self, id: &str) -> Self {
        self.failing_gear.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Distinct (after, before) ranges requested, in order.
    pub fn ranges(&self) -> Vec<(i64, i64)> {
        let mut ranges: Vec<(i64, i64)> = Vec::new();
        for (after, before, _, _) in self.calls() {
            if !ranges.contains(&(after, before)) {
                ranges.push((after, before));
            }
        }
        ranges
    }

    pub fn gear_lookups(&self) -> Vec<String> {
        self.gear_lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivitySource for FakeSource {
    async fn list_activities(
        &self,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push((after, before, page, per_page));

        if self.fail_page == Some(page) {
            let message = self
                .fail_message
                .clone()
                .unwrap_or_else(|| "Strava API error 500".to_string());
            return Err(AppError::StravaApi(message));
        }

        let mut matching: Vec<ActivityRecord> = self
            .remote
            .iter()
            .filter(|a| {
                a.start_time()
                    .map(|t| t.timestamp() >= after && t.timestamp() < before)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.start_time());

        let start = (page.saturating_sub(1) * per_page) as usize;
        Ok(matching
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect())
    }
}

#[async_trait]
impl GearSource for FakeSource {
    async fn active_gear(&self) -> Result<GearMap> {
        Ok(self.gear.clone())
    }

    async fn gear_name(&self, gear_id: &str) -> Result<String> {
        self.gear_lookups.lock().unwrap().push(gear_id.to_string());
        if self.failing_gear.contains(gear_id) {
            return Err(AppError::StravaApi("Strava API error 404".to_string()));
        }
        Ok(self
            .gear_names
            .get(gear_id)
            .cloned()
            .unwrap_or_else(|| "Unknown Name".to_string()))
    }
}

/// Token refresher returning a fixed response (or failing).
pub struct FakeRefresher {
    response: Option<TokenResponse>,
    calls: AtomicU32,
}

#[allow(dead_code)]
impl FakeRefresher {
    pub fn succeeding(access_token: &str, refresh_token: &str, expires_at: i64) -> Self {
        Self {
            response: Some(TokenResponse {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
                expires_at,
                extra: serde_json::Map::new(),
            }),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for FakeRefresher {
    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| AppError::StravaApi("Strava API error 400: bad refresh token".to_string()))
    }
}
