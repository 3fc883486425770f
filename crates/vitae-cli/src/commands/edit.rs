use std::path::Path;

use serde::Serialize;
use vitae_core::collab::{detect_conflicts, transform_and_apply};
use vitae_core::CollaborativeEdit;

use crate::commands::common::{format_timestamp, load_settings, read_json, write_atomically};
use crate::config::CliPaths;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct EditConflictGroup {
    pub edit_ids: Vec<String>,
    pub user_ids: Vec<String>,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
}

pub fn run_apply_edit(
    text_path: &Path,
    edit_path: &Path,
    pending_path: Option<&Path>,
    write: bool,
) -> Result<(), CliError> {
    let text = std::fs::read_to_string(text_path)?;
    let edit: CollaborativeEdit = read_json(edit_path)?;
    let pending = pending_path
        .map(read_json::<Vec<CollaborativeEdit>>)
        .transpose()?
        .unwrap_or_default();

    let (updated, transformed) = transform_and_apply(&text, &edit, &pending);
    if transformed.position != edit.position {
        tracing::debug!(
            "Edit {} moved from {} to {}",
            edit.id,
            edit.position,
            transformed.position
        );
    }

    if write {
        write_atomically(text_path, &updated)?;
        println!(
            "Applied {} at {} to {}",
            transformed.operation.as_str(),
            transformed.position,
            text_path.display()
        );
    } else {
        print!("{updated}");
    }
    Ok(())
}

pub fn run_edit_conflicts(
    edits_path: &Path,
    window_ms: Option<i64>,
    as_json: bool,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let edits: Vec<CollaborativeEdit> = read_json(edits_path)?;
    let window_ms = match window_ms {
        Some(window_ms) => window_ms,
        None => load_settings(paths)?.edit_conflict_window_ms,
    };

    let groups = detect_conflicts(&edits, window_ms)
        .iter()
        .map(|group| summarize_group(group))
        .collect::<Vec<_>>();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("No conflicting edits within {window_ms}ms.");
        return Ok(());
    }
    for line in format_group_lines(&groups) {
        println!("{line}");
    }
    Ok(())
}

pub fn summarize_group(group: &[CollaborativeEdit]) -> EditConflictGroup {
    let mut user_ids: Vec<String> = Vec::new();
    for edit in group {
        if !user_ids.contains(&edit.user_id) {
            user_ids.push(edit.user_id.clone());
        }
    }
    EditConflictGroup {
        edit_ids: group.iter().map(|edit| edit.id.clone()).collect(),
        user_ids,
        first_timestamp: group.iter().map(|edit| edit.timestamp).min().unwrap_or_default(),
        last_timestamp: group.iter().map(|edit| edit.timestamp).max().unwrap_or_default(),
    }
}

pub fn format_group_lines(groups: &[EditConflictGroup]) -> Vec<String> {
    groups
        .iter()
        .map(|group| {
            format!(
                "{}  {} edits by {}: {}",
                format_timestamp(group.first_timestamp),
                group.edit_ids.len(),
                group.user_ids.join(", "),
                group.edit_ids.join(" ")
            )
        })
        .collect()
}
