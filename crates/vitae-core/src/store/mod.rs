//! Version store layer for Vitae
//!
//! The sync engine never touches persistence directly; it reads and writes
//! authoritative profile snapshots through [`VersionStore`].

mod file;
mod memory;

pub use file::JsonFileVersionStore;
pub use memory::MemoryVersionStore;

use crate::error::Result;
use crate::models::ProfileSnapshot;

/// Trait for profile snapshot persistence
pub trait VersionStore {
    /// Get the authoritative snapshot of a profile, if one was saved
    fn get(&self, profile_id: &str) -> Result<Option<ProfileSnapshot>>;

    /// Save a snapshot as the authoritative version of its profile
    fn save(&mut self, snapshot: &ProfileSnapshot) -> Result<()>;
}

impl<S: VersionStore + ?Sized> VersionStore for Box<S> {
    fn get(&self, profile_id: &str) -> Result<Option<ProfileSnapshot>> {
        (**self).get(profile_id)
    }

    fn save(&mut self, snapshot: &ProfileSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}
