//! In-memory version store

use std::collections::HashMap;

use super::VersionStore;
use crate::error::Result;
use crate::models::ProfileSnapshot;

/// `HashMap` implementation of `VersionStore`
#[derive(Debug, Clone, Default)]
pub struct MemoryVersionStore {
    snapshots: HashMap<String, ProfileSnapshot>,
    saves: usize,
}

impl MemoryVersionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with snapshots
    pub fn with_snapshots(snapshots: impl IntoIterator<Item = ProfileSnapshot>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|snapshot| (snapshot.id.clone(), snapshot))
                .collect(),
            saves: 0,
        }
    }

    /// Number of successful `save` calls
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl VersionStore for MemoryVersionStore {
    fn get(&self, profile_id: &str) -> Result<Option<ProfileSnapshot>> {
        Ok(self.snapshots.get(profile_id).cloned())
    }

    fn save(&mut self, snapshot: &ProfileSnapshot) -> Result<()> {
        self.snapshots
            .insert(snapshot.id.clone(), snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}
