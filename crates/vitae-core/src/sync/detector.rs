//! Conflict detection between two snapshots of a profile

use crate::config::DEFAULT_CLOCK_SKEW_TOLERANCE_MS;
use crate::models::ProfileSnapshot;

/// Decides whether two snapshots of the same profile genuinely conflict.
///
/// Snapshots whose `updated_at` values lie closer together than the
/// tolerance are treated as the same save seen from two clocks and never
/// conflict, even when their bodies differ. Outside the tolerance, any
/// structural difference in the bodies is a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictDetector {
    tolerance_ms: i64,
}

impl ConflictDetector {
    #[must_use]
    pub const fn new(tolerance_ms: i64) -> Self {
        Self { tolerance_ms }
    }

    pub const fn tolerance_ms(&self) -> i64 {
        self.tolerance_ms
    }

    pub fn detect(&self, local: &ProfileSnapshot, remote: &ProfileSnapshot) -> bool {
        let skew = local.updated_at.abs_diff(remote.updated_at);
        if skew < self.tolerance_ms.unsigned_abs() {
            return false;
        }
        local.body != remote.body
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_SKEW_TOLERANCE_MS)
    }
}
