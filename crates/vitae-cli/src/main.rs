//! Vitae CLI - sync CV profiles across devices from the terminal
//!
//! Detects and resolves conflicting profile edits, browses and rolls back
//! sync history, and runs the collaborative edit tools over plain files.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::backup::{run_export, run_import};
use crate::commands::completions::run_completions;
use crate::commands::edit::{run_apply_edit, run_edit_conflicts};
use crate::commands::history::{run_history, run_rollback};
use crate::commands::sync::{run_cleanup, run_conflicts, run_detect, run_merge, run_resolve};
use crate::config::CliPaths;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "vitae=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = CliPaths::resolve(cli.config, cli.data_dir);

    match cli.command {
        Commands::Detect {
            local,
            remote,
            json,
        } => run_detect(&local, &remote, json, &paths).await?,
        Commands::Conflicts { json } => run_conflicts(json, &paths).await?,
        Commands::Merge { local, remote } => run_merge(&local, &remote)?,
        Commands::Resolve {
            id,
            strategy,
            merged,
            smart,
        } => {
            run_resolve(&id, strategy, merged.as_deref(), smart, &paths).await?;
        }
        Commands::History {
            profile,
            json,
            markdown,
        } => {
            run_history(profile.as_deref(), json, markdown, &paths).await?;
        }
        Commands::Rollback { id } => run_rollback(&id, &paths).await?,
        Commands::Cleanup { days } => run_cleanup(days, &paths).await?,
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &paths).await?;
        }
        Commands::Import { path, format } => run_import(&path, format, &paths).await?,
        Commands::ApplyEdit {
            text,
            edit,
            pending,
            write,
        } => run_apply_edit(&text, &edit, pending.as_deref(), write)?,
        Commands::EditConflicts {
            edits,
            window_ms,
            json,
        } => run_edit_conflicts(&edits, window_ms, json, &paths)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
