//! Multi-device profile sync
//!
//! Detects conflicting edits to the same profile, merges them
//! deterministically, and keeps a bounded history that can be rolled back.

mod detector;
mod ledger;
mod merge;
mod registry;

pub use detector::ConflictDetector;
pub use ledger::HistoryLedger;
pub use merge::smart_merge;
pub use registry::ConflictRegistry;
