//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use csvinv_core::CsvInvConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("csvinv")
        .join("config.json")
}

/// Load the configuration from `config_path`, or from the default location
/// if a file exists there, or fall back to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CsvInvConfig> {
    if let Some(path) = config_path {
        return Ok(CsvInvConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(CsvInvConfig::from_file(&default_path)?)
    } else {
        Ok(CsvInvConfig::default())
    }
}

/// A 0-100 progress bar showing the adapter's status message.
pub fn percent_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}
