// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line interface.

use std::io::BufRead;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::config::{parse_year_list, Config, ConfigError};
use crate::error::{AppError, Result};
use crate::pipeline;
use crate::services::strava::{exchange_and_store, StravaClient};
use crate::services::tokens::TokenStore;

#[derive(Debug, Parser)]
#[command(
    name = "strava-stats",
    version,
    about = "Archive Strava activities and publish summary tables"
)]
pub struct Cli {
    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Years to report on (comma separated), overrides STRAVA_YEARS
    #[arg(long, global = true)]
    pub years: Option<String>,

    /// Archive file, overrides STRAVA_ACTIVITIES_FILE
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,

    /// Output directory for table images, overrides STRAVA_IMAGES_DIR
    #[arg(long, global = true)]
    pub images_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync the archive, then summarize and render tables (default)
    Run,
    /// Only bring the archive up to date
    Sync,
    /// One-time authorization: exchange a code for tokens
    Auth {
        /// Authorization code; read from stdin when omitted
        #[arg(long)]
        code: Option<String>,

        /// Redirect URI registered with the Strava app
        #[arg(long, default_value = "http://localhost/exchange_token")]
        redirect_uri: String,
    },
}

impl Cli {
    /// Apply command-line overrides to the loaded configuration.
    ///
    /// `--years` is validated like `STRAVA_YEARS`.
    pub fn apply(&self, config: &mut Config) -> std::result::Result<(), ConfigError> {
        if let Some(raw) = &self.years {
            config.years = parse_year_list("--years", raw)?;
        }
        if let Some(archive) = &self.archive {
            config.activities_file = archive.clone();
        }
        if let Some(dir) = &self.images_dir {
            config.images_dir = dir.clone();
        }
        Ok(())
    }
}

/// Execute the selected command.
pub async fn run(cli: &Cli, config: &Config, now: DateTime<Utc>) -> Result<()> {
    match cli.command.as_ref().unwrap_or(&Command::Run) {
        Command::Run => {
            pipeline::run(config, now).await?;
        }
        Command::Sync => {
            let strava = pipeline::connect(config).await?;
            let outcome = pipeline::sync_archive(&strava, config, now).await?;
            tracing::info!(
                updated = outcome.updated,
                selected = outcome.records.len(),
                "Sync complete"
            );
        }
        Command::Auth { code, redirect_uri } => {
            authorize(config, code.as_deref(), redirect_uri).await?;
        }
    }
    Ok(())
}

async fn authorize(config: &Config, code: Option<&str>, redirect_uri: &str) -> Result<()> {
    let client = StravaClient::from_config(config)?;
    let store = TokenStore::new(&config.token_file);

    let code = match code {
        Some(code) => code.to_string(),
        None => {
            println!("Open this URL in a browser and authorize the app:\n");
            println!("{}\n", client.authorize_url(redirect_uri));
            println!("Then paste the `code` parameter from the redirect URL:");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| AppError::Setup(format!("Failed to read code: {}", e)))?;
            line
        }
    };

    if code.trim().is_empty() {
        return Err(AppError::Setup("No authorization code given".to_string()));
    }

    exchange_and_store(&client, &store, &code).await?;
    Ok(())
}
