use std::path::Path;

use vitae_core::models::{ProfileBody, ProfileSnapshot, ResolutionStrategy};
use vitae_core::sync::smart_merge;

use crate::cli::StrategyArg;
use crate::commands::common::{
    conflict_to_item, format_conflict_lines, now_ms, open_sync_service, read_json,
    save_after_profile_change, save_sync_state, ConflictListItem,
};
use crate::config::CliPaths;
use crate::error::CliError;

pub async fn run_detect(
    local_path: &Path,
    remote_path: &Path,
    as_json: bool,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let local: ProfileSnapshot = read_json(local_path)?;
    let remote: ProfileSnapshot = read_json(remote_path)?;

    let service = open_sync_service(paths).await?;
    let conflict = service.detect_and_register(&local, &remote).await;
    save_sync_state(&service, paths).await?;

    if as_json {
        let item = conflict.as_ref().map(conflict_to_item);
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    match conflict {
        Some(conflict) => println!("{}", conflict.id),
        None => println!("No conflict"),
    }
    Ok(())
}

pub async fn run_conflicts(as_json: bool, paths: &CliPaths) -> Result<(), CliError> {
    let service = open_sync_service(paths).await?;
    let conflicts = service.list_pending().await;

    if as_json {
        let items = conflicts
            .iter()
            .map(conflict_to_item)
            .collect::<Vec<ConflictListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No pending conflicts.");
        return Ok(());
    }

    for line in format_conflict_lines(&conflicts, now_ms()) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_merge(local_path: &Path, remote_path: &Path) -> Result<(), CliError> {
    let local: ProfileSnapshot = read_json(local_path)?;
    let remote: ProfileSnapshot = read_json(remote_path)?;
    let merged = smart_merge(&local.body, &remote.body);
    println!("{}", serde_json::to_string_pretty(&merged)?);
    Ok(())
}

pub async fn run_resolve(
    id: &str,
    strategy: StrategyArg,
    merged_path: Option<&Path>,
    smart: bool,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let strategy = ResolutionStrategy::from(strategy);
    if smart && !strategy.requires_merged_body() {
        return Err(CliError::SmartMergeStrategy(strategy.to_string()));
    }

    let service = open_sync_service(paths).await?;
    let merged_body = if smart {
        let conflict = service
            .conflict(id)
            .await
            .ok_or_else(|| vitae_core::Error::ConflictNotFound(id.to_string()))?;
        Some(conflict.smart_merge())
    } else {
        merged_path.map(read_json::<ProfileBody>).transpose()?
    };

    let resolved = service.resolve(id, strategy, merged_body).await?;
    save_after_profile_change(
        &service,
        paths,
        format!("Profile {} was saved from conflict {id}", resolved.id),
    )
    .await?;

    tracing::info!("Resolved conflict {id} with {strategy}");
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

pub async fn run_cleanup(days: Option<u32>, paths: &CliPaths) -> Result<(), CliError> {
    let service = open_sync_service(paths).await?;
    let removed = service.cleanup_resolved(days).await;
    save_sync_state(&service, paths).await?;

    println!("Removed {removed} resolved conflicts");
    Ok(())
}
