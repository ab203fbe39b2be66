// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava stats command-line entry point.
//!
//! Keeps a local archive of Strava activities up to date and publishes
//! summary tables for the configured years.

use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Datelike, Utc};
use clap::Parser;
use strava_stats::{
    cli::{self, Cli},
    config::{Config, ConfigError, LogFormat},
    error::AppError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let now = Utc::now();

    // Load configuration from environment
    let config = Config::from_env(now.year());
    let json_logs = cli.log_json
        || config
            .as_ref()
            .is_ok_and(|c| c.log_format == LogFormat::Json);
    init_logging(json_logs);

    match execute(&cli, config, now).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let fatal = e
                .downcast_ref::<AppError>()
                .is_some_and(AppError::is_fatal);
            tracing::error!(error = %format!("{:#}", e), fatal, "Run failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    cli: &Cli,
    config: Result<Config, ConfigError>,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut config = config
        .map_err(AppError::from)
        .context("Failed to load configuration")?;
    cli.apply(&mut config)
        .map_err(AppError::from)
        .context("Invalid command-line override")?;

    let command = match &cli.command {
        Some(cli::Command::Sync) => "sync",
        Some(cli::Command::Auth { .. }) => "auth",
        Some(cli::Command::Run) | None => "run",
    };
    cli::run(cli, &config, now)
        .await
        .with_context(|| format!("`{}` command failed", command))
}

/// Initialize logging: human-readable by default, JSON on request.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("strava_stats=debug,info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
