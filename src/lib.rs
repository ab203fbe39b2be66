// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Stats: a local archive of Strava activities and the yearly
//! summary tables derived from it.
//!
//! The archive is reconciled against the Strava API on every run: missing
//! years are downloaded in full, the current year is synced incrementally,
//! and archived past years are never fetched again.

pub mod cli;
pub mod config;
pub mod error;
pub mod format_utils;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod time_utils;
