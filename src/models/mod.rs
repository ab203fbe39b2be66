// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod stats;
pub mod token;

pub use activity::ActivityRecord;
pub use stats::Summary;
pub use token::{StoredTokens, TokenResponse};
