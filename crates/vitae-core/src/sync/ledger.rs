//! Size-bounded, append-only log of sync actions

use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::env::SyncEnv;
use crate::error::{Error, Result};
use crate::models::{HistoryAction, HistoryEntry, ProfileSnapshot};
use crate::store::VersionStore;
use crate::util::format_timestamp_ms;

/// FIFO history shared by every profile of a store.
///
/// Once more than `capacity` entries are held the oldest are evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryLedger {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Rebuild a ledger from stored entries, keeping only the newest ones.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>, capacity: usize) -> Self {
        let mut ledger = Self::new(capacity);
        for entry in entries {
            ledger.append(entry);
        }
        ledger
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry to the tail, evicting from the head past capacity.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!(
                    "Evicted history entry {} ({}) for profile {}",
                    evicted.id,
                    evicted.action.as_str(),
                    evicted.profile_id
                );
            }
        }
    }

    /// Record a plain sync, optionally with a restorable snapshot.
    pub fn record_sync(
        &mut self,
        profile_id: &str,
        details: impl Into<String>,
        snapshot: Option<ProfileSnapshot>,
        env: &SyncEnv,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: env.next_id(),
            profile_id: profile_id.to_string(),
            action: HistoryAction::Sync,
            timestamp: env.now_ms(),
            details: details.into(),
            snapshot,
        };
        self.append(entry.clone());
        entry
    }

    /// All retained entries, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Entries of one profile in insertion order.
    pub fn list_for(&self, profile_id: &str) -> Vec<&HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.profile_id == profile_id)
            .collect()
    }

    pub fn get(&self, history_id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == history_id)
    }

    /// Restore the snapshot carried by a history entry.
    ///
    /// The snapshot is saved exactly as recorded, then a `rollback` entry
    /// pointing at it is appended. Nothing changes if the save fails.
    pub fn rollback<S: VersionStore + ?Sized>(
        &mut self,
        history_id: &str,
        store: &mut S,
        env: &SyncEnv,
    ) -> Result<ProfileSnapshot> {
        let entry = self
            .get(history_id)
            .ok_or_else(|| Error::EntryNotFound(history_id.to_string()))?;
        let snapshot = entry
            .snapshot
            .clone()
            .ok_or_else(|| Error::NoSnapshotAvailable(history_id.to_string()))?;
        let details = format!(
            "Rolled back to version from {}",
            format_timestamp_ms(entry.timestamp)
        );
        let profile_id = entry.profile_id.clone();

        store.save(&snapshot)?;

        self.append(HistoryEntry {
            id: env.next_id(),
            profile_id,
            action: HistoryAction::Rollback,
            timestamp: env.now_ms(),
            details,
            snapshot: Some(snapshot.clone()),
        });

        tracing::info!(
            "Rolled back profile {} to history entry {history_id}",
            snapshot.name
        );
        Ok(snapshot)
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{ManualClock, SequentialIds};
    use crate::models::ProfileBody;
    use crate::store::MemoryVersionStore;
    use pretty_assertions::assert_eq;

    fn env() -> SyncEnv {
        SyncEnv::new(
            Arc::new(ManualClock::new(1_700_000_000_000)),
            Arc::new(SequentialIds::new("h")),
        )
    }

    fn entry(id: usize, profile_id: &str) -> HistoryEntry {
        HistoryEntry {
            id: format!("entry-{id}"),
            profile_id: profile_id.to_string(),
            action: HistoryAction::Sync,
            timestamp: i64::try_from(id).unwrap(),
            details: format!("sync {id}"),
            snapshot: None,
        }
    }

    #[test]
    fn keeps_fifty_most_recent_entries() {
        let mut ledger = HistoryLedger::default();
        for id in 1..=60 {
            ledger.append(entry(id, "p1"));
        }

        let retained = ledger.list_for("p1");
        assert_eq!(retained.len(), 50);
        assert_eq!(retained.first().unwrap().id, "entry-11");
        assert_eq!(retained.last().unwrap().id, "entry-60");
        assert!(ledger.get("entry-10").is_none());
    }

    #[test]
    fn list_for_filters_by_profile_in_insertion_order() {
        let mut ledger = HistoryLedger::new(10);
        ledger.append(entry(1, "a"));
        ledger.append(entry(2, "b"));
        ledger.append(entry(3, "a"));

        let ids: Vec<&str> = ledger.list_for("a").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["entry-1", "entry-3"]);
    }

    #[test]
    fn from_entries_trims_to_capacity() {
        let ledger = HistoryLedger::from_entries((1..=5).map(|id| entry(id, "p")), 3);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.all().next().unwrap().id, "entry-3");
    }

    #[test]
    fn rollback_restores_snapshot_byte_for_byte() {
        let env = env();
        let mut ledger = HistoryLedger::default();
        let mut store = MemoryVersionStore::new();
        let snapshot = ProfileSnapshot::new(
            "p1",
            "Main",
            ProfileBody {
                skills: vec!["Rust".to_string()],
                ..ProfileBody::default()
            },
            123,
        );
        let recorded = ledger.record_sync("p1", "initial sync", Some(snapshot.clone()), &env);

        let restored = ledger.rollback(&recorded.id, &mut store, &env).unwrap();

        let stored = store.get("p1").unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&stored).unwrap(),
            serde_json::to_string(&snapshot).unwrap()
        );
        assert_eq!(restored, snapshot);

        let history = ledger.list_for("p1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, HistoryAction::Rollback);
        assert_eq!(history[1].snapshot.as_ref(), Some(&snapshot));
        assert!(history[1].details.starts_with("Rolled back to version from "));
    }

    #[test]
    fn rollback_of_unknown_entry_fails() {
        let mut ledger = HistoryLedger::default();
        let mut store = MemoryVersionStore::new();
        let error = ledger.rollback("missing", &mut store, &env()).unwrap_err();
        assert!(matches!(error, Error::EntryNotFound(id) if id == "missing"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn rollback_without_snapshot_fails_without_side_effects() {
        let env = env();
        let mut ledger = HistoryLedger::default();
        let mut store = MemoryVersionStore::new();
        let recorded = ledger.record_sync("p1", "metadata only", None, &env);

        let error = ledger.rollback(&recorded.id, &mut store, &env).unwrap_err();

        assert!(matches!(error, Error::NoSnapshotAvailable(_)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(store.save_count(), 0);
    }

    struct UnwritableStore;

    impl VersionStore for UnwritableStore {
        fn get(&self, _profile_id: &str) -> Result<Option<ProfileSnapshot>> {
            Ok(None)
        }

        fn save(&mut self, _snapshot: &ProfileSnapshot) -> Result<()> {
            Err(Error::Storage("disk full".to_string()))
        }
    }

    #[test]
    fn rollback_with_failing_store_leaves_ledger_untouched() {
        let env = env();
        let mut ledger = HistoryLedger::default();
        let snapshot = ProfileSnapshot::new("p1", "Main", ProfileBody::default(), 1);
        let recorded = ledger.record_sync("p1", "initial sync", Some(snapshot), &env);

        let error = ledger
            .rollback(&recorded.id, &mut UnwritableStore, &env)
            .unwrap_err();

        assert!(matches!(error, Error::Storage(message) if message == "disk full"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.list_for("p1")[0].action, HistoryAction::Sync);
    }
}
