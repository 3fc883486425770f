//! Serialized access to a profile store, its conflicts and its history.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::KeyedLocks;
use crate::config::SyncSettings;
use crate::env::SyncEnv;
use crate::error::{Error, Result};
use crate::export::BackupDocument;
use crate::models::{
    HistoryEntry, ProfileBody, ProfileSnapshot, ResolutionStrategy, SyncConflict,
};
use crate::store::VersionStore;
use crate::sync::{ConflictDetector, ConflictRegistry, HistoryLedger};

struct SyncState<S> {
    store: S,
    registry: ConflictRegistry,
    ledger: HistoryLedger,
}

/// What an import added to the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub conflicts_added: usize,
    pub conflicts_skipped: usize,
    pub history_added: usize,
    pub history_skipped: usize,
}

/// Thread-safe service for conflict resolution and history operations.
///
/// Mutations of one profile are serialized through a per-profile lock, so
/// two resolves (or a resolve and a rollback) of the same profile never
/// interleave. Different profiles proceed independently.
pub struct SyncService<S> {
    state: Arc<Mutex<SyncState<S>>>,
    profile_locks: KeyedLocks,
    settings: SyncSettings,
    env: SyncEnv,
}

impl<S> Clone for SyncService<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            profile_locks: self.profile_locks.clone(),
            settings: self.settings,
            env: self.env.clone(),
        }
    }
}

impl<S: VersionStore + Send> SyncService<S> {
    pub fn new(store: S, settings: SyncSettings, env: SyncEnv) -> Self {
        let registry =
            ConflictRegistry::new(ConflictDetector::new(settings.clock_skew_tolerance_ms));
        let ledger = HistoryLedger::new(settings.history_capacity);
        Self {
            state: Arc::new(Mutex::new(SyncState {
                store,
                registry,
                ledger,
            })),
            profile_locks: KeyedLocks::new(),
            settings,
            env,
        }
    }

    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Latest stored snapshot of a profile.
    pub async fn current(&self, profile_id: &str) -> Result<Option<ProfileSnapshot>> {
        let state = self.state.lock().await;
        state.store.get(profile_id)
    }

    /// Compare two snapshots and register a conflict when they diverge.
    pub async fn detect_and_register(
        &self,
        local: &ProfileSnapshot,
        remote: &ProfileSnapshot,
    ) -> Option<SyncConflict> {
        let _profile = self.profile_locks.lock(&local.id).await;
        let mut state = self.state.lock().await;
        state.registry.detect_and_register(local, remote, &self.env)
    }

    /// Pending conflicts, oldest first.
    pub async fn list_pending(&self) -> Vec<SyncConflict> {
        let state = self.state.lock().await;
        state.registry.list_pending().into_iter().cloned().collect()
    }

    pub async fn conflict(&self, conflict_id: &str) -> Option<SyncConflict> {
        let state = self.state.lock().await;
        state.registry.get(conflict_id).cloned()
    }

    pub async fn resolve(
        &self,
        conflict_id: &str,
        strategy: ResolutionStrategy,
        merged_body: Option<ProfileBody>,
    ) -> Result<ProfileSnapshot> {
        let profile_id = self
            .conflict(conflict_id)
            .await
            .map(|conflict| conflict.profile_id)
            .ok_or_else(|| Error::ConflictNotFound(conflict_id.to_string()))?;

        let _profile = self.profile_locks.lock(&profile_id).await;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.registry.resolve(
            conflict_id,
            strategy,
            merged_body,
            &mut state.store,
            &mut state.ledger,
            &self.env,
        )
    }

    pub async fn rollback(&self, history_id: &str) -> Result<ProfileSnapshot> {
        let profile_id = {
            let state = self.state.lock().await;
            state
                .ledger
                .get(history_id)
                .map(|entry| entry.profile_id.clone())
                .ok_or_else(|| Error::EntryNotFound(history_id.to_string()))?
        };

        let _profile = self.profile_locks.lock(&profile_id).await;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state
            .ledger
            .rollback(history_id, &mut state.store, &self.env)
    }

    /// Persist a snapshot and record the sync with a restorable copy.
    pub async fn record_sync(
        &self,
        snapshot: &ProfileSnapshot,
        details: impl Into<String> + Send,
    ) -> Result<HistoryEntry> {
        let _profile = self.profile_locks.lock(&snapshot.id).await;
        let mut state = self.state.lock().await;
        state.store.save(snapshot)?;
        Ok(state
            .ledger
            .record_sync(&snapshot.id, details, Some(snapshot.clone()), &self.env))
    }

    pub async fn history_for(&self, profile_id: &str) -> Vec<HistoryEntry> {
        let state = self.state.lock().await;
        state.ledger.list_for(profile_id).into_iter().cloned().collect()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        let state = self.state.lock().await;
        state.ledger.all().cloned().collect()
    }

    /// Drop resolved conflicts past the retention window.
    ///
    /// `None` uses the configured retention.
    pub async fn cleanup_resolved(&self, retention_days: Option<u32>) -> usize {
        let days = retention_days.unwrap_or(self.settings.conflict_retention_days);
        let now = self.env.now_ms();
        let mut state = self.state.lock().await;
        state.registry.cleanup_resolved(days, now)
    }

    pub async fn export_backup(&self) -> BackupDocument {
        let state = self.state.lock().await;
        BackupDocument::new(
            self.env.now_ms(),
            state.registry.all().to_vec(),
            state.ledger.all().cloned().collect(),
        )
    }

    /// Merge a backup into the running state.
    ///
    /// Records whose id is already known are skipped; imported history is
    /// appended after existing entries and still bounded by the ledger.
    pub async fn import_backup(&self, document: BackupDocument) -> ImportSummary {
        let mut summary = ImportSummary::default();
        let mut state = self.state.lock().await;

        for conflict in document.conflicts {
            if state.registry.restore(conflict) {
                summary.conflicts_added += 1;
            } else {
                summary.conflicts_skipped += 1;
            }
        }
        for entry in document.history {
            if state.ledger.get(&entry.id).is_some() {
                summary.history_skipped += 1;
            } else {
                state.ledger.append(entry);
                summary.history_added += 1;
            }
        }

        tracing::info!(
            "Imported {} conflicts and {} history entries ({} duplicates skipped)",
            summary.conflicts_added,
            summary.history_added,
            summary.conflicts_skipped + summary.history_skipped
        );
        summary
    }
}
