//! Tunable thresholds for sync and collaboration.
//!
//! Settings are read from an optional JSON file. Missing files and missing
//! fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::compact_text;

/// Snapshots saved closer together than this never count as conflicting.
pub const DEFAULT_CLOCK_SKEW_TOLERANCE_MS: i64 = 5_000;
/// Maximum number of retained history entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;
/// Participants unseen for this long are no longer active.
pub const DEFAULT_INACTIVITY_THRESHOLD_MS: i64 = 300_000;
/// Window used to group overlapping edits for auditing.
pub const DEFAULT_EDIT_CONFLICT_WINDOW_MS: i64 = 1_000;
/// Resolved conflicts older than this are dropped by cleanup.
pub const DEFAULT_CONFLICT_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    pub clock_skew_tolerance_ms: i64,
    pub history_capacity: usize,
    pub inactivity_threshold_ms: i64,
    pub edit_conflict_window_ms: i64,
    pub conflict_retention_days: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            clock_skew_tolerance_ms: DEFAULT_CLOCK_SKEW_TOLERANCE_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            inactivity_threshold_ms: DEFAULT_INACTIVITY_THRESHOLD_MS,
            edit_conflict_window_ms: DEFAULT_EDIT_CONFLICT_WINDOW_MS,
            conflict_retention_days: DEFAULT_CONFLICT_RETENTION_DAYS,
        }
    }
}

impl SyncSettings {
    /// Load settings from `path`, or defaults when the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw).map_err(|error| match error {
            Error::InvalidInput(message) => {
                Error::InvalidInput(format!("{} ({message})", path.display()))
            }
            other => other,
        })
    }

    /// Parse settings from a JSON payload.
    pub fn parse(payload: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(payload).map_err(|error| {
            Error::InvalidInput(format!(
                "invalid settings JSON: {}",
                compact_text(&error.to_string())
            ))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("clock_skew_tolerance_ms", self.clock_skew_tolerance_ms > 0),
            ("history_capacity", self.history_capacity > 0),
            ("inactivity_threshold_ms", self.inactivity_threshold_ms > 0),
            ("edit_conflict_window_ms", self.edit_conflict_window_ms > 0),
            ("conflict_retention_days", self.conflict_retention_days > 0),
        ];
        match positive.iter().find(|(_, valid)| !valid) {
            Some((field, _)) => Err(Error::InvalidInput(format!(
                "{field} must be greater than zero"
            ))),
            None => Ok(()),
        }
    }
}
