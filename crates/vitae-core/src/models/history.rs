//! Sync history model

use serde::{Deserialize, Serialize};

use super::ProfileSnapshot;

/// Kind of sync action recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Sync,
    Conflict,
    Rollback,
}

impl HistoryAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Conflict => "conflict",
            Self::Rollback => "rollback",
        }
    }
}

/// Append-only audit record; never mutated after it is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub profile_id: String,
    pub action: HistoryAction,
    /// Unix ms
    pub timestamp: i64,
    pub details: String,
    /// Restorable copy of the profile, when one was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ProfileSnapshot>,
}
