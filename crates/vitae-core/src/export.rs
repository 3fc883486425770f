//! Backup export and import of sync state.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{HistoryEntry, SyncConflict};
use crate::util::format_timestamp_ms;

/// Current backup schema version.
pub const BACKUP_VERSION: u32 = 1;

/// Backup serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupFormat {
    /// One pretty-printed document
    Json,
    /// One tagged record per line
    JsonLines,
}

impl BackupFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonLines => "jsonl",
        }
    }
}

/// Everything needed to rebuild a device's conflict registry and ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub version: u32,
    /// Unix ms
    pub exported_at: i64,
    #[serde(default)]
    pub conflicts: Vec<SyncConflict>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl BackupDocument {
    #[must_use]
    pub fn new(
        exported_at: i64,
        conflicts: Vec<SyncConflict>,
        history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at,
            conflicts,
            history,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum BackupRecord {
    Backup { version: u32, exported_at: i64 },
    Conflict(SyncConflict),
    History(HistoryEntry),
}

pub fn render_backup(document: &BackupDocument, format: BackupFormat) -> Result<String> {
    match format {
        BackupFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        BackupFormat::JsonLines => render_json_lines(document),
    }
}

fn render_json_lines(document: &BackupDocument) -> Result<String> {
    let mut output = serde_json::to_string(&BackupRecord::Backup {
        version: document.version,
        exported_at: document.exported_at,
    })?;
    output.push('\n');

    for conflict in &document.conflicts {
        output.push_str(&serde_json::to_string(&BackupRecord::Conflict(
            conflict.clone(),
        ))?);
        output.push('\n');
    }
    for entry in &document.history {
        output.push_str(&serde_json::to_string(&BackupRecord::History(entry.clone()))?);
        output.push('\n');
    }
    Ok(output)
}

/// Parse a backup payload, rejecting malformed or unsupported input.
pub fn parse_backup(payload: &str, format: BackupFormat) -> Result<BackupDocument> {
    let document = match format {
        BackupFormat::Json => serde_json::from_str::<BackupDocument>(payload).map_err(|error| {
            Error::ImportParseError(format!("invalid backup document: {error}"))
        })?,
        BackupFormat::JsonLines => parse_json_lines(payload)?,
    };

    if document.version != BACKUP_VERSION {
        return Err(Error::ImportParseError(format!(
            "unsupported backup version {}",
            document.version
        )));
    }
    Ok(document)
}

fn parse_json_lines(payload: &str) -> Result<BackupDocument> {
    let mut header = None;
    let mut conflicts = Vec::new();
    let mut history = Vec::new();

    for (index, line) in payload.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_number = index + 1;
        let record: BackupRecord = serde_json::from_str(line).map_err(|error| {
            Error::ImportParseError(format!("line {line_number}: {error}"))
        })?;
        match record {
            BackupRecord::Backup {
                version,
                exported_at,
            } => {
                if header.replace((version, exported_at)).is_some() {
                    return Err(Error::ImportParseError(format!(
                        "line {line_number}: duplicate backup header"
                    )));
                }
            }
            BackupRecord::Conflict(conflict) => conflicts.push(conflict),
            BackupRecord::History(entry) => history.push(entry),
        }
    }

    let (version, exported_at) = header.ok_or_else(|| {
        Error::ImportParseError("missing backup header record".to_string())
    })?;
    Ok(BackupDocument {
        version,
        exported_at,
        conflicts,
        history,
    })
}

/// Render history entries as a Markdown audit log.
#[must_use]
pub fn render_history_markdown(entries: &[&HistoryEntry]) -> String {
    let mut output = String::from("# Sync history\n");

    for entry in entries {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## {} · {}",
            format_timestamp_ms(entry.timestamp),
            entry.action.as_str()
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "- id: {}", entry.id);
        let _ = writeln!(output, "- profile: {}", entry.profile_id);
        let _ = writeln!(
            output,
            "- snapshot: {}",
            if entry.snapshot.is_some() { "yes" } else { "no" }
        );
        let _ = writeln!(output);
        output.push_str(&entry.details);
        output.push('\n');
    }

    output
}

#[must_use]
pub fn suggested_backup_file_name(format: BackupFormat, timestamp_ms: i64) -> String {
    format!("vitae-backup-{timestamp_ms}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryAction, ProfileBody, ProfileSnapshot};
    use pretty_assertions::assert_eq;

    fn sample() -> BackupDocument {
        let local = ProfileSnapshot::new("p1", "Main", ProfileBody::default(), 10);
        let remote = ProfileSnapshot::new(
            "p1",
            "Main",
            ProfileBody {
                skills: vec!["Rust".to_string()],
                ..ProfileBody::default()
            },
            9_000,
        );
        BackupDocument::new(
            1_700_000_000_000,
            vec![SyncConflict {
                id: "c1".to_string(),
                profile_id: "p1".to_string(),
                local_version: local.clone(),
                remote_version: remote,
                detected_at: 9_500,
                resolved: false,
            }],
            vec![HistoryEntry {
                id: "h1".to_string(),
                profile_id: "p1".to_string(),
                action: HistoryAction::Sync,
                timestamp: 0,
                details: "initial sync".to_string(),
                snapshot: Some(local),
            }],
        )
    }

    #[test]
    fn json_lines_tag_every_record() {
        let rendered = render_backup(&sample(), BackupFormat::JsonLines).unwrap();
        let kinds: Vec<String> = rendered
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["kind"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(kinds, vec!["backup", "conflict", "history"]);
        assert_eq!(parse_backup(&rendered, BackupFormat::JsonLines).unwrap(), sample());
    }

    #[test]
    fn json_document_parses_back() {
        let rendered = render_backup(&sample(), BackupFormat::Json).unwrap();
        assert!(rendered.contains("\"version\": 1"));
        assert_eq!(parse_backup(&rendered, BackupFormat::Json).unwrap(), sample());
    }

    #[test]
    fn malformed_json_is_an_import_error() {
        let error = parse_backup("{\"version\": ", BackupFormat::Json).unwrap_err();
        assert!(matches!(error, Error::ImportParseError(message) if message.starts_with("invalid backup document")));

        let error = parse_backup("\"just text\"", BackupFormat::Json).unwrap_err();
        assert!(matches!(error, Error::ImportParseError(_)));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = parse_backup(r#"{"version": 2, "exported_at": 0}"#, BackupFormat::Json)
            .unwrap_err();
        assert!(matches!(error, Error::ImportParseError(message) if message.contains("version 2")));
    }

    #[test]
    fn json_lines_errors_name_the_line() {
        let payload = "{\"kind\":\"backup\",\"version\":1,\"exported_at\":0}\n\n{\"kind\":\"bogus\"}\n";
        let error = parse_backup(payload, BackupFormat::JsonLines).unwrap_err();
        assert!(matches!(error, Error::ImportParseError(message) if message.starts_with("line 3:")));
    }

    #[test]
    fn json_lines_require_header() {
        let error = parse_backup("", BackupFormat::JsonLines).unwrap_err();
        assert!(matches!(error, Error::ImportParseError(message) if message.contains("header")));
    }

    #[test]
    fn markdown_lists_entries() {
        let document = sample();
        let entries: Vec<&HistoryEntry> = document.history.iter().collect();
        let rendered = render_history_markdown(&entries);
        assert!(rendered.starts_with("# Sync history\n"));
        assert!(rendered.contains("## 1970-01-01T00:00:00.000Z · sync"));
        assert!(rendered.contains("- profile: p1"));
        assert!(rendered.contains("- snapshot: yes"));
        assert!(rendered.contains("initial sync"));
    }

    #[test]
    fn suggested_file_name_uses_extension() {
        assert_eq!(
            suggested_backup_file_name(BackupFormat::JsonLines, 42),
            "vitae-backup-42.jsonl"
        );
        assert_eq!(
            suggested_backup_file_name(BackupFormat::Json, 42),
            "vitae-backup-42.json"
        );
    }
}
