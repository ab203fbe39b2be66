// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregate;
pub mod archive;
pub mod classify;
pub mod fetch;
pub mod gear;
pub mod reconcile;
pub mod render;
pub mod strava;
pub mod tokens;

pub use aggregate::{summarize, SummaryBuilder};
pub use archive::{Archive, ArchiveStore};
pub use classify::{Classifier, TagRule};
pub use fetch::{fetch_range, ActivitySource, FetchOutcome};
pub use gear::{resolve_gear_names, GearMap, GearSource};
pub use reconcile::{plan_year, ReconcileOutcome, Reconciler, YearPlan, YearReport};
pub use render::{dashboard_tables, publish_dashboard, write_summary, Table};
pub use strava::{StravaClient, StravaService};
pub use tokens::{TokenRefresher, TokenStore};
