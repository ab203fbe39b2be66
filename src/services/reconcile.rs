// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Archive reconciliation.
//!
//! Brings the archive up to date for a set of target years with as few
//! remote fetches as possible:
//! - past years already in the archive are complete and never re-fetched
//! - years missing from the archive are downloaded in full
//! - the current year is synced incrementally from its latest activity
//!
//! Fetched records are merged by activity ID, so overlapping pages or
//! range edges never produce duplicates.

use chrono::{DateTime, Datelike, Utc};

use crate::error::Result;
use crate::models::ActivityRecord;
use crate::services::archive::{Archive, ArchiveStore};
use crate::services::fetch::{fetch_range, ActivitySource};
use crate::time_utils;

/// What a reconciliation pass does for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPlan {
    /// Past year already archived.
    Skip,
    /// Year absent from the archive: fetch `[after, before)` in full.
    FullFetch { after: i64, before: i64 },
    /// Current year: fetch only activities newer than `after`.
    Incremental { after: i64, before: i64 },
    /// Year has no representable `[Jan 1, Jan 1 next)` range; never fetched.
    OutOfRange,
}

impl YearPlan {
    pub fn label(&self) -> &'static str {
        match self {
            YearPlan::Skip => "skip",
            YearPlan::FullFetch { .. } => "full",
            YearPlan::Incremental { .. } => "incremental",
            YearPlan::OutOfRange => "out_of_range",
        }
    }
}

/// Decide how to bring `year` up to date.
pub fn plan_year(archive: &Archive, year: i32, now: DateTime<Utc>) -> YearPlan {
    let Some((year_start, year_end)) = time_utils::year_bounds(year) else {
        return YearPlan::OutOfRange;
    };

    if !archive.has_year(year) {
        return YearPlan::FullFetch {
            after: year_start,
            before: year_end,
        };
    }

    if year < now.year() {
        return YearPlan::Skip;
    }

    // A year-only start_date still counts as coverage; sync from Jan 1.
    let after = archive
        .latest_start_in_year(year)
        .map(|latest| latest.timestamp())
        .unwrap_or(year_start);
    // `before` is exclusive upstream; +1 makes `now` itself reachable.
    let before = now.timestamp() + 1;
    if after >= before {
        return YearPlan::Skip;
    }
    YearPlan::Incremental { after, before }
}

/// Per-year result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearReport {
    pub year: i32,
    pub plan: YearPlan,
    /// Records returned by the source
    pub fetched: usize,
    /// Records added to the archive
    pub merged: usize,
    /// Records dropped because their ID was already archived
    pub duplicates: usize,
    /// `false` when pagination stopped on an error
    pub complete: bool,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Whether any record was merged into the archive
    pub updated: bool,
    /// Archive records belonging to the target years, ascending by start
    pub records: Vec<ActivityRecord>,
    /// One report per distinct target year, in request order
    pub years: Vec<YearReport>,
}

impl ReconcileOutcome {
    /// Years whose fetch stopped early and may be missing activities.
    pub fn incomplete_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|r| !r.complete)
            .map(|r| r.year)
            .collect()
    }
}

/// Reconciles an archive against a remote activity source.
pub struct Reconciler<'a, S: ?Sized> {
    source: &'a S,
    per_page: u32,
}

impl<'a, S> Reconciler<'a, S>
where
    S: ActivitySource + ?Sized,
{
    pub fn new(source: &'a S, per_page: u32) -> Self {
        Self { source, per_page }
    }

    /// Update `archive` in memory for `target_years` as of `now`.
    ///
    /// The archive is re-sorted only if something was merged. The returned
    /// records are limited to the target years even though the archive
    /// keeps every year it has ever held.
    pub async fn reconcile(
        &self,
        archive: &mut Archive,
        target_years: &[i32],
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        let years = distinct_years(target_years);
        let mut reports = Vec::with_capacity(years.len());
        let mut updated = false;

        for &year in &years {
            let plan = plan_year(archive, year, now);
            let (after, before) = match plan {
                YearPlan::Skip => {
                    tracing::info!(year, "Archived past year, skipping");
                    reports.push(YearReport {
                        year,
                        plan,
                        fetched: 0,
                        merged: 0,
                        duplicates: 0,
                        complete: true,
                    });
                    continue;
                }
                YearPlan::OutOfRange => {
                    tracing::warn!(year, "Year outside the supported calendar range, skipping");
                    reports.push(YearReport {
                        year,
                        plan,
                        fetched: 0,
                        merged: 0,
                        duplicates: 0,
                        complete: true,
                    });
                    continue;
                }
                YearPlan::FullFetch { after, before } => {
                    tracing::info!(year, "Missing locally, downloading full year");
                    (after, before)
                }
                YearPlan::Incremental { after, before } => {
                    tracing::info!(year, after, "Syncing current year incrementally");
                    (after, before)
                }
            };

            let fetch = fetch_range(self.source, after, before, self.per_page).await;
            let fetched = fetch.records.len();
            let mut merged = 0usize;
            for record in fetch.records {
                if archive.insert(record) {
                    merged += 1;
                }
            }
            updated |= merged > 0;

            if !fetch.complete {
                tracing::warn!(
                    year,
                    fetched,
                    "Fetch stopped early; year may be incomplete"
                );
            }
            tracing::info!(
                year,
                plan = plan.label(),
                fetched,
                merged,
                duplicates = fetched - merged,
                "Year reconciled"
            );

            reports.push(YearReport {
                year,
                plan,
                fetched,
                merged,
                duplicates: fetched - merged,
                complete: fetch.complete,
            });
        }

        if updated {
            archive.sort_by_start();
        }

        let records = archive.records_for_years(&years);
        tracing::info!(
            updated,
            archived = archive.len(),
            selected = records.len(),
            "Reconciliation finished"
        );

        ReconcileOutcome {
            updated,
            records,
            years: reports,
        }
    }

    /// Load the archive from `store`, reconcile it and write it back if
    /// anything was merged. An unchanged archive leaves the file untouched.
    pub async fn sync(
        &self,
        store: &ArchiveStore,
        target_years: &[i32],
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome> {
        let mut archive = store.load();
        let outcome = self.reconcile(&mut archive, target_years, now).await;

        if outcome.updated {
            store.save(&archive)?;
        } else {
            tracing::info!("No new activities, archive left untouched");
        }
        Ok(outcome)
    }
}

/// Drop repeated years, keeping the first occurrence's position.
fn distinct_years(years: &[i32]) -> Vec<i32> {
    let mut out: Vec<i32> = Vec::with_capacity(years.len());
    for &year in years {
        if !out.contains(&year) {
            out.push(year);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_activity(id: u64, date: &str) -> ActivityRecord {
        ActivityRecord {
            id,
            name: format!("Activity {}", id),
            sport_type: Some("Ride".to_string()),
            activity_type: None,
            start_date: date.to_string(),
            start_date_local: None,
            distance: 1000.0,
            total_elevation_gain: 0.0,
            gear_id: None,
            extra: serde_json::Map::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_plan_past_year_present_is_skip() {
        let archive = Archive::from_records(vec![make_activity(1, "2023-04-01T00:00:00Z")]);
        assert_eq!(plan_year(&archive, 2023, now()), YearPlan::Skip);
    }

    #[test]
    fn test_plan_missing_year_is_full_fetch() {
        let archive = Archive::from_records(vec![make_activity(1, "2023-04-01T00:00:00Z")]);
        let (after, before) = time_utils::year_bounds(2022).unwrap();
        assert_eq!(
            plan_year(&archive, 2022, now()),
            YearPlan::FullFetch { after, before }
        );
        let (after, before) = time_utils::year_bounds(2025).unwrap();
        assert_eq!(
            plan_year(&archive, 2025, now()),
            YearPlan::FullFetch { after, before }
        );
    }

    #[test]
    fn test_plan_current_year_present_is_incremental() {
        let archive = Archive::from_records(vec![
            make_activity(1, "2025-02-01T00:00:00Z"),
            make_activity(2, "2025-05-01T08:00:00Z"),
            make_activity(3, "2024-12-31T00:00:00Z"),
        ]);
        let latest = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();

        assert_eq!(
            plan_year(&archive, 2025, now()),
            YearPlan::Incremental {
                after: latest.timestamp(),
                before: now().timestamp() + 1,
            }
        );
    }

    #[test]
    fn test_plan_unrepresentable_year_is_out_of_range() {
        let archive = Archive::default();
        assert_eq!(plan_year(&archive, 300_000, now()), YearPlan::OutOfRange);
        assert_eq!(plan_year(&archive, i32::MAX, now()), YearPlan::OutOfRange);
    }

    #[test]
    fn test_distinct_years_keeps_order() {
        assert_eq!(distinct_years(&[2024, 2022, 2024, 2023]), vec![2024, 2022, 2023]);
    }
}
