//! JSON file version store
//!
//! One pretty-printed file per profile, written through a temporary file and
//! renamed into place so readers never observe a half-written snapshot.

use std::path::{Path, PathBuf};

use super::VersionStore;
use crate::error::{Error, Result};
use crate::models::ProfileSnapshot;

#[derive(Debug, Clone)]
pub struct JsonFileVersionStore {
    root: PathBuf,
}

impl JsonFileVersionStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids of every profile with a saved snapshot, sorted
    pub fn profile_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn snapshot_path(&self, profile_id: &str) -> Result<PathBuf> {
        validate_profile_id(profile_id)?;
        Ok(self.root.join(format!("{profile_id}.json")))
    }
}

impl VersionStore for JsonFileVersionStore {
    fn get(&self, profile_id: &str) -> Result<Option<ProfileSnapshot>> {
        let path = self.snapshot_path(profile_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)?;
        let snapshot = serde_json::from_str(&raw).map_err(|error| {
            Error::Storage(format!("failed to parse {}: {error}", path.display()))
        })?;
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &ProfileSnapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.id)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, serde_json::to_string_pretty(snapshot)?)?;
        std::fs::rename(&temp_path, &path)?;
        tracing::debug!("Saved profile {} to {}", snapshot.id, path.display());
        Ok(())
    }
}

fn validate_profile_id(profile_id: &str) -> Result<()> {
    let trimmed = profile_id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("profile id cannot be empty".to_string()));
    }
    if trimmed != profile_id
        || profile_id.contains(['/', '\\'])
        || profile_id.contains("..")
    {
        return Err(Error::InvalidInput(format!(
            "profile id '{profile_id}' cannot be used as a file name"
        )));
    }
    Ok(())
}
