//! Sync conflict model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ProfileBody, ProfileSnapshot};
use crate::sync::smart_merge;

/// Two divergent snapshots of the same profile awaiting resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConflict {
    /// Conflict identifier
    pub id: String,
    /// Profile involved in the conflict
    pub profile_id: String,
    /// Snapshot held by this device
    pub local_version: ProfileSnapshot,
    /// Snapshot received from elsewhere
    pub remote_version: ProfileSnapshot,
    /// Detection timestamp (Unix ms)
    pub detected_at: i64,
    /// Flips to true exactly once, when the conflict is resolved
    pub resolved: bool,
}

impl SyncConflict {
    /// Smart merge of both sides, local first.
    #[must_use]
    pub fn smart_merge(&self) -> ProfileBody {
        smart_merge(&self.local_version.body, &self.remote_version.body)
    }

    /// Newest `updated_at` of the two sides.
    pub fn latest_observed_update(&self) -> i64 {
        self.local_version
            .updated_at
            .max(self.remote_version.updated_at)
    }
}

/// How a conflict is turned into a single profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    KeepLocal,
    KeepRemote,
    Merge,
    Manual,
}

impl ResolutionStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepLocal => "keep-local",
            Self::KeepRemote => "keep-remote",
            Self::Merge => "merge",
            Self::Manual => "manual",
        }
    }

    /// Whether the caller has to supply the resulting body
    #[must_use]
    pub const fn requires_merged_body(self) -> bool {
        matches!(self, Self::Merge | Self::Manual)
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep-local" | "local" => Ok(Self::KeepLocal),
            "keep-remote" | "remote" => Ok(Self::KeepRemote),
            "merge" => Ok(Self::Merge),
            "manual" => Ok(Self::Manual),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown resolution strategy '{other}'"
            ))),
        }
    }
}
