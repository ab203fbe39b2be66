// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated range fetch shared by full-year downloads and incremental sync.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::ActivityRecord;

/// A remote source of activities that can be listed by time range.
///
/// `StravaService` is the production implementation; tests drive the
/// reconciler with an in-memory source.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch one page of activities with `after < start_date < before`.
    ///
    /// Pages are 1-based. An empty page means there is nothing more.
    async fn list_activities(
        &self,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>>;
}

/// Result of a paginated range fetch.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Records in the order the source returned them
    pub records: Vec<ActivityRecord>,
    /// Number of non-empty pages received
    pub pages: u32,
    /// `false` when a page request failed and pagination stopped early
    pub complete: bool,
}

/// Fetch every page of `(after, before)` starting at page 1.
///
/// Stops at the first empty page. A failed page ends pagination too, but
/// the pages already received are returned with `complete = false` rather
/// than discarded.
pub async fn fetch_range<S>(source: &S, after: i64, before: i64, per_page: u32) -> FetchOutcome
where
    S: ActivitySource + ?Sized,
{
    let mut outcome = FetchOutcome::default();
    let mut page = 1u32;

    loop {
        match source.list_activities(after, before, page, per_page).await {
            Ok(batch) if batch.is_empty() => {
                outcome.complete = true;
                break;
            }
            Ok(batch) => {
                tracing::debug!(page, items = batch.len(), "Page loaded");
                outcome.pages += 1;
                outcome.records.extend(batch);
                page += 1;
            }
            Err(e) => {
                tracing::warn!(
                    page,
                    after,
                    before,
                    kept = outcome.records.len(),
                    kind = failure_kind(&e),
                    error = %e,
                    "Page fetch failed, keeping pages already loaded"
                );
                break;
            }
        }
    }

    outcome
}

/// Short label for a failed page request, used as a log field.
pub fn failure_kind(err: &AppError) -> &'static str {
    if err.is_rate_limited() {
        "rate_limited"
    } else if err.is_strava_token_error() {
        "token_rejected"
    } else {
        "request_failed"
    }
}
