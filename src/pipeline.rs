// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end pipeline: sync the archive, summarize, publish.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::models::stats::Summary;
use crate::services::aggregate::summarize;
use crate::services::archive::ArchiveStore;
use crate::services::classify::Classifier;
use crate::services::fetch::ActivitySource;
use crate::services::gear::{resolve_gear_names, GearSource, GEAR_LOOKUP_PAUSE};
use crate::services::reconcile::{ReconcileOutcome, Reconciler};
use crate::services::render::{publish_dashboard, write_summary};
use crate::services::strava::{StravaClient, StravaService};
use crate::services::tokens::TokenStore;

/// What a full pipeline run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub reconcile: ReconcileOutcome,
    pub summary: Summary,
    pub images: Vec<PathBuf>,
}

/// Connect to Strava with the configured token file.
///
/// Fails (fatally) if the token file is missing or a needed refresh fails.
pub async fn connect(config: &Config) -> Result<StravaService> {
    let client = StravaClient::from_config(config)?;
    let tokens = TokenStore::new(&config.token_file);
    StravaService::connect(client, &tokens).await
}

/// Bring the archive up to date for the configured years.
pub async fn sync_archive<S>(source: &S, config: &Config, now: DateTime<Utc>) -> Result<ReconcileOutcome>
where
    S: ActivitySource + ?Sized,
{
    let store = ArchiveStore::new(&config.activities_file);
    let reconciler = Reconciler::new(source, config.per_page);
    let outcome = reconciler.sync(&store, &config.years, now).await?;

    let incomplete = outcome.incomplete_years();
    if !incomplete.is_empty() {
        tracing::warn!(years = ?incomplete, "Some years were only partially fetched");
    }
    Ok(outcome)
}

/// Sync, summarize and publish using `source` for activities and gear.
pub async fn run_with<S>(source: &S, config: &Config, now: DateTime<Utc>) -> Result<PipelineReport>
where
    S: ActivitySource + GearSource + ?Sized,
{
    tracing::info!(years = ?config.years, "Starting Strava stats pipeline");

    let reconcile = sync_archive(source, config, now).await?;

    let gear = resolve_gear_names(source, &reconcile.records, GEAR_LOOKUP_PAUSE).await;
    let classifier = Classifier::new(config.category_tags.clone());
    let summary = summarize(&reconcile.records, &classifier, &gear, &config.years);

    write_summary(&summary, &config.summaries_file)?;
    let images = publish_dashboard(&summary, &config.images_dir)?;

    tracing::info!(
        activities = reconcile.records.len(),
        images = images.len(),
        "Pipeline complete"
    );

    Ok(PipelineReport {
        reconcile,
        summary,
        images,
    })
}

/// Full run against the live Strava API.
pub async fn run(config: &Config, now: DateTime<Utc>) -> Result<PipelineReport> {
    let strava = connect(config).await?;
    run_with(&strava, config, now).await
}
