//! Pending conflict bookkeeping and resolution

use super::{ConflictDetector, HistoryLedger};
use crate::env::SyncEnv;
use crate::error::{Error, Result};
use crate::models::{
    HistoryAction, HistoryEntry, ProfileBody, ProfileSnapshot, ResolutionStrategy, SyncConflict,
};
use crate::store::VersionStore;

const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

/// Holds every conflict seen by this store until it is cleaned up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictRegistry {
    detector: ConflictDetector,
    conflicts: Vec<SyncConflict>,
}

impl ConflictRegistry {
    #[must_use]
    pub const fn new(detector: ConflictDetector) -> Self {
        Self {
            detector,
            conflicts: Vec::new(),
        }
    }

    pub const fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    /// Register a conflict when the two snapshots genuinely diverge.
    ///
    /// The conflict is filed under the local snapshot's profile id.
    pub fn detect_and_register(
        &mut self,
        local: &ProfileSnapshot,
        remote: &ProfileSnapshot,
        env: &SyncEnv,
    ) -> Option<SyncConflict> {
        if !self.detector.detect(local, remote) {
            return None;
        }

        let conflict = SyncConflict {
            id: env.next_id(),
            profile_id: local.id.clone(),
            local_version: local.clone(),
            remote_version: remote.clone(),
            detected_at: env.now_ms(),
            resolved: false,
        };
        self.conflicts.push(conflict.clone());

        tracing::warn!(
            "Sync conflict {} detected for profile {} ({})",
            conflict.id,
            local.name,
            local.id
        );
        Some(conflict)
    }

    /// Conflicts still waiting for a resolution, oldest first
    pub fn list_pending(&self) -> Vec<&SyncConflict> {
        self.conflicts
            .iter()
            .filter(|conflict| !conflict.resolved)
            .collect()
    }

    pub fn all(&self) -> &[SyncConflict] {
        &self.conflicts
    }

    pub fn get(&self, conflict_id: &str) -> Option<&SyncConflict> {
        self.conflicts
            .iter()
            .find(|conflict| conflict.id == conflict_id)
    }

    /// Add a conflict recorded elsewhere. Returns false if the id is known.
    pub fn restore(&mut self, conflict: SyncConflict) -> bool {
        if self.get(&conflict.id).is_some() {
            return false;
        }
        self.conflicts.push(conflict);
        true
    }

    /// Resolve a pending conflict and persist the outcome.
    ///
    /// Validation happens before anything is written: unknown ids, repeated
    /// resolutions, missing merged bodies and conflicts overtaken by a newer
    /// stored version all fail without touching the store, the registry or
    /// the ledger.
    pub fn resolve<S: VersionStore + ?Sized>(
        &mut self,
        conflict_id: &str,
        strategy: ResolutionStrategy,
        merged_body: Option<ProfileBody>,
        store: &mut S,
        ledger: &mut HistoryLedger,
        env: &SyncEnv,
    ) -> Result<ProfileSnapshot> {
        let index = self
            .conflicts
            .iter()
            .position(|conflict| conflict.id == conflict_id)
            .ok_or_else(|| Error::ConflictNotFound(conflict_id.to_string()))?;
        let conflict = &self.conflicts[index];
        if conflict.resolved {
            return Err(Error::AlreadyResolved(conflict_id.to_string()));
        }

        let body = match strategy {
            ResolutionStrategy::KeepLocal => conflict.local_version.body.clone(),
            ResolutionStrategy::KeepRemote => conflict.remote_version.body.clone(),
            ResolutionStrategy::Merge | ResolutionStrategy::Manual => {
                merged_body.ok_or_else(|| Error::MissingMergedData(strategy.to_string()))?
            }
        };

        if let Some(current) = store.get(&conflict.profile_id)? {
            if current.updated_at > conflict.latest_observed_update() {
                return Err(Error::StaleConflict {
                    conflict_id: conflict_id.to_string(),
                    profile_id: conflict.profile_id.clone(),
                    current_updated_at: current.updated_at,
                });
            }
        }

        let now = env.now_ms();
        let identity = match strategy {
            ResolutionStrategy::KeepRemote => &conflict.remote_version,
            _ => &conflict.local_version,
        };
        let resolved = identity.with_body(body, now);
        let profile_id = conflict.profile_id.clone();

        store.save(&resolved)?;

        self.conflicts[index].resolved = true;
        ledger.append(HistoryEntry {
            id: env.next_id(),
            profile_id,
            action: HistoryAction::Conflict,
            timestamp: now,
            details: format!("Conflict resolved using {strategy} strategy"),
            snapshot: Some(resolved.clone()),
        });

        tracing::info!(
            "Conflict {conflict_id} resolved for profile {} using {strategy}",
            resolved.name
        );
        Ok(resolved)
    }

    /// Drop resolved conflicts detected more than `retention_days` ago.
    ///
    /// Unresolved conflicts are always kept. Returns how many were removed.
    pub fn cleanup_resolved(&mut self, retention_days: u32, now_ms: i64) -> usize {
        let cutoff = now_ms.saturating_sub(i64::from(retention_days).saturating_mul(DAY_MS));
        let before = self.conflicts.len();
        self.conflicts
            .retain(|conflict| !conflict.resolved || conflict.detected_at > cutoff);
        let removed = before - self.conflicts.len();
        if removed > 0 {
            tracing::info!("Removed {removed} resolved conflicts older than {retention_days} days");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::env::{Clock, ManualClock, SequentialIds};
    use crate::store::MemoryVersionStore;
    use crate::sync::smart_merge;
    use pretty_assertions::assert_eq;

    const T: i64 = 1_700_000_000_000;

    struct Fixture {
        clock: Arc<ManualClock>,
        env: SyncEnv,
        registry: ConflictRegistry,
        ledger: HistoryLedger,
        store: MemoryVersionStore,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(T + 20_000));
        let env = SyncEnv::new(clock.clone(), Arc::new(SequentialIds::new("id")));
        Fixture {
            clock,
            env,
            registry: ConflictRegistry::default(),
            ledger: HistoryLedger::default(),
            store: MemoryVersionStore::new(),
        }
    }

    fn snapshot(skills: &[&str], updated_at: i64) -> ProfileSnapshot {
        ProfileSnapshot::new(
            "p1",
            "Main",
            ProfileBody {
                skills: skills.iter().map(ToString::to_string).collect(),
                ..ProfileBody::default()
            },
            updated_at,
        )
    }

    #[test]
    fn merge_resolution_end_to_end() {
        let mut f = fixture();
        let local = snapshot(&["JS", "React"], T);
        let remote = snapshot(&["JS", "Node"], T + 10_000);

        let conflict = f
            .registry
            .detect_and_register(&local, &remote, &f.env)
            .expect("conflict expected");
        assert_eq!(f.registry.list_pending().len(), 1);

        let merged = smart_merge(&local.body, &remote.body);
        let resolved = f
            .registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::Merge,
                Some(merged),
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap();

        assert_eq!(resolved.body.skills, vec!["JS", "React", "Node"]);
        assert_eq!(resolved.updated_at, T + 20_000);
        assert_eq!(f.store.get("p1").unwrap(), Some(resolved.clone()));
        assert!(f.registry.list_pending().is_empty());

        let history = f.ledger.list_for("p1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Conflict);
        assert!(history[0].details.contains("merge"));
        assert_eq!(history[0].snapshot.as_ref(), Some(&resolved));
    }

    #[test]
    fn close_timestamps_do_not_register() {
        let mut f = fixture();
        let local = snapshot(&["JS", "React"], T);
        let remote = snapshot(&["JS", "Node"], T + 2_000);

        assert!(f.registry.detect_and_register(&local, &remote, &f.env).is_none());
        assert!(f.registry.all().is_empty());
    }

    #[test]
    fn second_resolve_is_rejected_and_persists_once() {
        let mut f = fixture();
        let conflict = f
            .registry
            .detect_and_register(&snapshot(&["A"], T), &snapshot(&["B"], T + 9_000), &f.env)
            .unwrap();

        f.registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::KeepLocal,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap();
        let error = f
            .registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::KeepLocal,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap_err();

        assert!(matches!(error, Error::AlreadyResolved(_)));
        assert_eq!(f.store.save_count(), 1);
        assert_eq!(f.ledger.len(), 1);
    }

    #[test]
    fn unknown_conflict_is_reported() {
        let mut f = fixture();
        let error = f
            .registry
            .resolve(
                "nope",
                ResolutionStrategy::KeepRemote,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap_err();
        assert!(matches!(error, Error::ConflictNotFound(id) if id == "nope"));
    }

    #[test]
    fn merge_and_manual_need_a_body() {
        let mut f = fixture();
        let conflict = f
            .registry
            .detect_and_register(&snapshot(&["A"], T), &snapshot(&["B"], T + 9_000), &f.env)
            .unwrap();

        for strategy in [ResolutionStrategy::Merge, ResolutionStrategy::Manual] {
            let error = f
                .registry
                .resolve(&conflict.id, strategy, None, &mut f.store, &mut f.ledger, &f.env)
                .unwrap_err();
            assert!(matches!(error, Error::MissingMergedData(_)));
        }
        assert_eq!(f.registry.list_pending().len(), 1);
        assert_eq!(f.store.save_count(), 0);
        assert!(f.ledger.is_empty());
    }

    #[test]
    fn keep_remote_uses_remote_identity_and_body() {
        let mut f = fixture();
        let local = snapshot(&["A"], T);
        let mut remote = snapshot(&["B"], T + 9_000);
        remote.name = "Renamed".to_string();
        let conflict = f
            .registry
            .detect_and_register(&local, &remote, &f.env)
            .unwrap();

        let resolved = f
            .registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::KeepRemote,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap();

        assert_eq!(resolved.name, "Renamed");
        assert_eq!(resolved.body, remote.body);
        assert_eq!(resolved.updated_at, f.clock.now_ms());
    }

    #[test]
    fn newer_stored_version_makes_conflict_stale() {
        let mut f = fixture();
        let conflict = f
            .registry
            .detect_and_register(&snapshot(&["A"], T), &snapshot(&["B"], T + 9_000), &f.env)
            .unwrap();
        f.store.save(&snapshot(&["C"], T + 15_000)).unwrap();

        let error = f
            .registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::KeepLocal,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap_err();

        assert!(matches!(error, Error::StaleConflict { .. }));
        assert_eq!(f.registry.list_pending().len(), 1);
        assert_eq!(f.store.save_count(), 1);
    }

    #[test]
    fn cleanup_keeps_unresolved_and_recent() {
        let mut f = fixture();
        let old = f
            .registry
            .detect_and_register(&snapshot(&["A"], T), &snapshot(&["B"], T + 9_000), &f.env)
            .unwrap();
        f.registry
            .detect_and_register(&snapshot(&["C"], T), &snapshot(&["D"], T + 9_000), &f.env)
            .unwrap();
        f.registry
            .resolve(
                &old.id,
                ResolutionStrategy::KeepLocal,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap();

        f.clock.advance(31 * DAY_MS);
        let removed = f.registry.cleanup_resolved(30, f.clock.now_ms());

        assert_eq!(removed, 1);
        assert_eq!(f.registry.all().len(), 1);
        assert!(!f.registry.all()[0].resolved);
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
    fn failed_save_leaves_conflict_pending_and_ledger_empty() {
        let mut f = fixture();
        let conflict = f
            .registry
            .detect_and_register(&snapshot(&["A"], T), &snapshot(&["B"], T + 9_000), &f.env)
            .unwrap();

        let error = f
            .registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::KeepRemote,
                None,
                &mut UnwritableStore,
                &mut f.ledger,
                &f.env,
            )
            .unwrap_err();

        assert!(matches!(error, Error::Storage(message) if message == "disk full"));
        assert!(!f.registry.get(&conflict.id).unwrap().resolved);
        assert_eq!(f.registry.list_pending().len(), 1);
        assert!(f.ledger.is_empty());

        f.registry
            .resolve(
                &conflict.id,
                ResolutionStrategy::KeepRemote,
                None,
                &mut f.store,
                &mut f.ledger,
                &f.env,
            )
            .unwrap();
        assert_eq!(f.ledger.len(), 1);
    }
}
