use std::path::Path;

use vitae_core::export::{parse_backup, render_backup, suggested_backup_file_name, BackupFormat};

use crate::cli::BackupFormatArg;
use crate::commands::common::{open_sync_service, save_sync_state, write_atomically};
use crate::config::CliPaths;
use crate::error::CliError;

pub async fn run_export(
    format: BackupFormatArg,
    output_path: Option<&Path>,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let format = BackupFormat::from(format);
    let service = open_sync_service(paths).await?;
    let document = service.export_backup().await;
    let rendered = render_backup(&document, format)?;

    if let Some(path) = output_path {
        let target = if path.is_dir() {
            path.join(suggested_backup_file_name(format, document.exported_at))
        } else {
            path.to_path_buf()
        };
        write_atomically(&target, &rendered)?;
        println!("{}", target.display());
    } else {
        print!("{rendered}");
    }

    Ok(())
}

pub async fn run_import(
    input_path: &Path,
    format: Option<BackupFormatArg>,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let format = format.map_or_else(|| infer_format(input_path), BackupFormat::from);
    let raw = std::fs::read_to_string(input_path)?;
    let document = parse_backup(&raw, format)?;

    let service = open_sync_service(paths).await?;
    let summary = service.import_backup(document).await;
    save_sync_state(&service, paths).await?;

    println!(
        "Imported {} conflicts and {} history entries ({} conflicts, {} entries already present)",
        summary.conflicts_added,
        summary.history_added,
        summary.conflicts_skipped,
        summary.history_skipped
    );
    Ok(())
}

pub fn infer_format(path: &Path) -> BackupFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jsonl") => BackupFormat::JsonLines,
        _ => BackupFormat::Json,
    }
}
