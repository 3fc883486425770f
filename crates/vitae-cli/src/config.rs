//! Where the CLI keeps its settings and state.

use std::env;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "vitae";
const CONFIG_FILE_NAME: &str = "config.json";
const PROFILES_DIR_NAME: &str = "profiles";
const STATE_FILE_NAME: &str = "sync-state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliPaths {
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
}

impl CliPaths {
    /// Resolve paths from flags, then `VITAE_CONFIG`/`VITAE_DATA_DIR`, then
    /// the platform directories.
    pub fn resolve(config_flag: Option<PathBuf>, data_dir_flag: Option<PathBuf>) -> Self {
        Self {
            config_file: config_flag
                .or_else(|| env::var_os("VITAE_CONFIG").map(PathBuf::from))
                .unwrap_or_else(default_config_path),
            data_dir: data_dir_flag
                .or_else(|| env::var_os("VITAE_DATA_DIR").map(PathBuf::from))
                .unwrap_or_else(default_data_dir),
        }
    }

    /// Paths rooted in one directory; settings live next to the data.
    pub fn in_dir(root: &Path) -> Self {
        Self {
            config_file: root.join(CONFIG_FILE_NAME),
            data_dir: root.to_path_buf(),
        }
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join(PROFILES_DIR_NAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE_NAME)
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
