use vitae_core::export::render_history_markdown;

use crate::commands::common::{format_history_lines, open_sync_service, save_after_profile_change};
use crate::config::CliPaths;
use crate::error::CliError;

pub async fn run_history(
    profile: Option<&str>,
    as_json: bool,
    as_markdown: bool,
    paths: &CliPaths,
) -> Result<(), CliError> {
    let service = open_sync_service(paths).await?;
    let entries = match profile {
        Some(profile_id) => service.history_for(profile_id).await,
        None => service.history().await,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if as_markdown {
        let refs = entries.iter().collect::<Vec<_>>();
        print!("{}", render_history_markdown(&refs));
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history recorded.");
        return Ok(());
    }
    for line in format_history_lines(&entries) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_rollback(id: &str, paths: &CliPaths) -> Result<(), CliError> {
    let service = open_sync_service(paths).await?;
    let restored = service.rollback(id).await?;
    save_after_profile_change(
        &service,
        paths,
        format!("Profile {} was rolled back to {id}", restored.id),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&restored)?);
    Ok(())
}
