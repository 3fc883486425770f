use std::path::Path;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vitae_core::config::SyncSettings;
use vitae_core::export::{parse_backup, render_backup, BackupFormat};
use vitae_core::services::SyncService;
use vitae_core::store::JsonFileVersionStore;
use vitae_core::{HistoryEntry, SyncConflict, SyncEnv};

use crate::config::CliPaths;
use crate::error::CliError;

pub type FileSyncService = SyncService<JsonFileVersionStore>;

#[derive(Debug, Serialize)]
pub struct ConflictListItem {
    pub id: String,
    pub profile_id: String,
    pub profile_name: String,
    pub local_updated_at: i64,
    pub remote_updated_at: i64,
    pub detected_at: i64,
    pub detected_at_iso: String,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|error| CliError::InvalidFile {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}

/// Write via a sibling temp file so readers never see half a file.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, contents)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

pub fn load_settings(paths: &CliPaths) -> Result<SyncSettings, CliError> {
    Ok(SyncSettings::load_from_path(&paths.config_file)?)
}

/// Open the file-backed sync service and reload saved conflicts and history.
pub async fn open_sync_service(paths: &CliPaths) -> Result<FileSyncService, CliError> {
    let settings = load_settings(paths)?;
    let store = JsonFileVersionStore::open(paths.profiles_dir())?;
    let service = SyncService::new(store, settings, SyncEnv::system());

    let state_file = paths.state_file();
    if state_file.exists() {
        let raw = std::fs::read_to_string(&state_file)?;
        let document = parse_backup(&raw, BackupFormat::Json)?;
        service.import_backup(document).await;
    } else {
        tracing::debug!("No saved sync state at {}", state_file.display());
    }
    Ok(service)
}

pub async fn save_sync_state(service: &FileSyncService, paths: &CliPaths) -> Result<(), CliError> {
    let document = service.export_backup().await;
    write_atomically(
        &paths.state_file(),
        &render_backup(&document, BackupFormat::Json)?,
    )
}

/// Save state after the profile store already changed, naming that change on failure.
pub async fn save_after_profile_change(
    service: &FileSyncService,
    paths: &CliPaths,
    change: impl Into<String> + Send,
) -> Result<(), CliError> {
    save_sync_state(service, paths)
        .await
        .map_err(|error| CliError::StateNotSaved {
            change: change.into(),
            source: Box::new(error),
        })
}

pub fn conflict_to_item(conflict: &SyncConflict) -> ConflictListItem {
    ConflictListItem {
        id: conflict.id.clone(),
        profile_id: conflict.profile_id.clone(),
        profile_name: conflict.local_version.name.clone(),
        local_updated_at: conflict.local_version.updated_at,
        remote_updated_at: conflict.remote_version.updated_at,
        detected_at: conflict.detected_at,
        detected_at_iso: format_timestamp(conflict.detected_at),
    }
}

pub fn format_conflict_lines(conflicts: &[SyncConflict], now_ms: i64) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{:<13}  {:<20}  local={} remote={}  detected {}",
                short_id(&conflict.id),
                conflict.local_version.name,
                format_timestamp(conflict.local_version.updated_at),
                format_timestamp(conflict.remote_version.updated_at),
                format_relative_time(conflict.detected_at, now_ms)
            )
        })
        .collect()
}

pub fn format_history_lines(entries: &[HistoryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let marker = if entry.snapshot.is_some() { "*" } else { " " };
            format!(
                "{}  {:<8}{marker} {:<13}  {}  [{}]",
                format_timestamp(entry.timestamp),
                entry.action.as_str(),
                short_id(&entry.profile_id),
                entry.details,
                entry.id
            )
        })
        .collect()
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else {
        format!("{}d ago", diff / day)
    }
}
