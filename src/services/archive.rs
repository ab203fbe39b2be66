// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local activity archive: the in-memory collection and its JSON file.
//!
//! The archive is the superset of every year ever fetched. It holds each
//! activity ID at most once and is kept sorted by `start_date` whenever it
//! is written.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::ActivityRecord;

/// In-memory archive with an ID index for deduplication.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    records: Vec<ActivityRecord>,
    ids: HashSet<u64>,
}

impl Archive {
    /// Build an archive from records, dropping repeated IDs (first wins).
    pub fn from_records(records: Vec<ActivityRecord>) -> Self {
        let mut archive = Self::default();
        for record in records {
            archive.insert(record);
        }
        archive
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Insert a record unless its ID is already known.
    ///
    /// Returns `true` if the record was added.
    pub fn insert(&mut self, record: ActivityRecord) -> bool {
        if !self.ids.insert(record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Distinct years present in the archive.
    pub fn year_coverage(&self) -> BTreeSet<i32> {
        self.records.iter().filter_map(|r| r.year()).collect()
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.records.iter().any(|r| r.year() == Some(year))
    }

    /// Latest `start_date` among records of `year`.
    pub fn latest_start_in_year(&self, year: i32) -> Option<DateTime<Utc>> {
        self.records
            .iter()
            .filter(|r| r.year() == Some(year))
            .filter_map(|r| r.start_time())
            .max()
    }

    /// Sort ascending by `start_date`. Stable, so equal timestamps keep
    /// their insertion order.
    pub fn sort_by_start(&mut self) {
        self.records.sort_by_key(|r| r.start_time());
    }

    /// Records whose year is one of `years`, in archive order.
    pub fn records_for_years(&self, years: &[i32]) -> Vec<ActivityRecord> {
        self.records
            .iter()
            .filter(|r| r.year().is_some_and(|y| years.contains(&y)))
            .cloned()
            .collect()
    }
}

/// JSON file backing the archive.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the archive.
    ///
    /// A missing file is an empty archive. An unreadable or corrupt file is
    /// also treated as empty (and logged), at the cost of re-fetching.
    pub fn load(&self) -> Archive {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No archive yet, starting empty");
            return Archive::default();
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Archive unreadable, treating as empty"
                );
                return Archive::default();
            }
        };

        match serde_json::from_str::<Vec<ActivityRecord>>(&raw) {
            Ok(records) => {
                let total = records.len();
                let archive = Archive::from_records(records);
                if archive.len() != total {
                    tracing::warn!(
                        dropped = total - archive.len(),
                        "Archive contained duplicate activity IDs"
                    );
                }
                tracing::info!(
                    path = %self.path.display(),
                    activities = archive.len(),
                    years = ?archive.year_coverage(),
                    "Archive loaded"
                );
                archive
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Archive corrupt, treating as empty"
                );
                Archive::default()
            }
        }
    }

    /// Replace the archive file with `archive`, pretty-printed.
    ///
    /// Written to a temp file in the same directory and renamed over the
    /// target, so readers never observe a half-written archive.
    pub fn save(&self, archive: &Archive) -> Result<()> {
        let json = serde_json::to_string_pretty(archive.records())?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::info!(
            path = %self.path.display(),
            activities = archive.len(),
            "Archive written"
        );
        Ok(())
    }
}

/// Atomically replace `path` with `contents`, creating parent directories.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| AppError::io(&dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| AppError::io(&dir, e))?;
    let tmp_path = tmp.path().to_path_buf();
    tmp.write_all(contents)
        .map_err(|e| AppError::io(&tmp_path, e))?;
    tmp.write_all(b"\n")
        .map_err(|e| AppError::io(&tmp_path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| AppError::io(&tmp_path, e))?;
    tmp.persist(path).map_err(|e| AppError::io(path, e.error))?;
    Ok(())
}
