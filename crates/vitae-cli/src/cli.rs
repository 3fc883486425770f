use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vitae_core::export::BackupFormat;
use vitae_core::models::ResolutionStrategy;

#[derive(Parser)]
#[command(name = "vitae")]
#[command(about = "Sync CV profiles across devices and resolve conflicting edits")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding profiles and sync state
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Path to the settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two profile snapshots and record a conflict if they diverge
    Detect {
        /// Snapshot held by this device
        local: PathBuf,
        /// Snapshot received from another device
        remote: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pending conflicts
    Conflicts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the smart merge of two snapshots without recording anything
    Merge {
        local: PathBuf,
        remote: PathBuf,
    },
    /// Resolve a pending conflict
    Resolve {
        /// Conflict ID
        id: String,
        /// How to settle the conflict
        #[arg(long, value_enum)]
        strategy: StrategyArg,
        /// Profile body to use for merge/manual strategies
        #[arg(long, value_name = "PATH", conflicts_with = "smart")]
        merged: Option<PathBuf>,
        /// Use the smart merge of both sides as the merged body
        #[arg(long)]
        smart: bool,
    },
    /// Show sync history
    History {
        /// Only show entries of this profile
        #[arg(long, value_name = "ID")]
        profile: Option<String>,
        /// Output as JSON
        #[arg(long, conflicts_with = "markdown")]
        json: bool,
        /// Output as Markdown
        #[arg(long)]
        markdown: bool,
    },
    /// Restore the profile snapshot recorded by a history entry
    Rollback {
        /// History entry ID
        id: String,
    },
    /// Drop old resolved conflicts
    Cleanup {
        /// Retention in days (defaults to the configured retention)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Export conflicts and history
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = BackupFormatArg::Json)]
        format: BackupFormatArg,
        /// Optional output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Import conflicts and history from a backup
    Import {
        /// Backup file
        path: PathBuf,
        /// Backup format (inferred from the extension when omitted)
        #[arg(long, value_enum)]
        format: Option<BackupFormatArg>,
    },
    /// Transform an edit against pending edits and apply it to a text file
    ApplyEdit {
        /// Text document
        text: PathBuf,
        /// Edit to apply (JSON)
        edit: PathBuf,
        /// Concurrent edits to transform against (JSON array)
        #[arg(long, value_name = "PATH")]
        pending: Option<PathBuf>,
        /// Write the result back to the text file
        #[arg(long)]
        write: bool,
    },
    /// Group edits that overlap within a time window
    EditConflicts {
        /// Edits to inspect (JSON array)
        edits: PathBuf,
        /// Window in milliseconds (defaults to the configured window)
        #[arg(long, value_name = "MS")]
        window_ms: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    KeepLocal,
    KeepRemote,
    Merge,
    Manual,
}

impl From<StrategyArg> for ResolutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::KeepLocal => Self::KeepLocal,
            StrategyArg::KeepRemote => Self::KeepRemote,
            StrategyArg::Merge => Self::Merge,
            StrategyArg::Manual => Self::Manual,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum BackupFormatArg {
    Json,
    Jsonl,
}

impl From<BackupFormatArg> for BackupFormat {
    fn from(value: BackupFormatArg) -> Self {
        match value {
            BackupFormatArg::Json => Self::Json,
            BackupFormatArg::Jsonl => Self::JsonLines,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
