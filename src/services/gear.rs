// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gear ID to name resolution.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ActivityRecord;

/// Name used when a gear lookup fails.
pub const UNKNOWN_GEAR_NAME: &str = "Unknown Name";

/// Pause between single-gear lookups to stay friendly with rate limits.
pub const GEAR_LOOKUP_PAUSE: Duration = Duration::from_millis(200);

/// Map of gear ID to human-readable name.
pub type GearMap = HashMap<String, String>;

/// Source of gear names.
#[async_trait]
pub trait GearSource: Send + Sync {
    /// The athlete's active bikes and shoes.
    async fn active_gear(&self) -> Result<GearMap>;

    /// Name of one gear item, including retired gear.
    async fn gear_name(&self, gear_id: &str) -> Result<String>;
}

/// Resolve names for every gear ID used by `activities`.
///
/// Starts from the active gear list (empty if that call fails) and looks up
/// the remaining IDs one at a time, pausing `pause` between calls.
pub async fn resolve_gear_names<S>(
    source: &S,
    activities: &[ActivityRecord],
    pause: Duration,
) -> GearMap
where
    S: GearSource + ?Sized,
{
    let mut gear_map = match source.active_gear().await {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch athlete gear");
            GearMap::new()
        }
    };

    let missing: BTreeSet<&str> = activities
        .iter()
        .filter_map(|a| a.gear_id.as_deref())
        .filter(|id| !gear_map.contains_key(*id))
        .collect();

    if missing.is_empty() {
        return gear_map;
    }

    tracing::info!(count = missing.len(), "Resolving unknown gear IDs");
    for (i, gear_id) in missing.into_iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        let name = match source.gear_name(gear_id).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(gear_id, error = %e, "Gear lookup failed");
                UNKNOWN_GEAR_NAME.to_string()
            }
        };
        gear_map.insert(gear_id.to_string(), name);
    }

    gear_map
}
