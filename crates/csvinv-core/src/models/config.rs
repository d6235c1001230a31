//! Configuration structures for CSV ingestion.

use serde::{Deserialize, Serialize};

use super::options::ParseOptions;
use crate::error::{CsvInvError, Result};

/// Main configuration for the csvinv pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvInvConfig {
    /// CSV reader configuration.
    pub csv: CsvConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Processing behaviour.
    pub processing: ProcessingConfig,
}

/// CSV reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field delimiter (single ASCII character).
    pub delimiter: char,

    /// Whether the first row is a header row.
    pub has_headers: bool,

    /// Trim whitespace around fields.
    pub trim: bool,

    /// Accept rows with a differing number of fields.
    pub flexible: bool,

    /// Maximum data rows per file (0 = unlimited).
    pub max_rows: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_headers: true,
            trim: true,
            flexible: false,
            max_rows: 0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Enable NIP checksum validation.
    pub validate_nip: bool,

    /// Default currency if a row has none.
    pub default_currency: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate_nip: true,
            default_currency: "PLN".to_string(),
        }
    }
}

/// Processing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Report row progress every this many rows.
    pub progress_interval: usize,

    /// Keep going when a file in a batch fails.
    pub continue_on_error: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            progress_interval: 100,
            continue_on_error: true,
        }
    }
}

impl CsvInvConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Build per-call parse options from this configuration.
    pub fn parse_options(&self) -> Result<ParseOptions> {
        if !self.csv.delimiter.is_ascii() {
            return Err(CsvInvError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.csv.delimiter
            )));
        }

        Ok(ParseOptions {
            delimiter: self.csv.delimiter as u8,
            has_headers: self.csv.has_headers,
            trim: self.csv.trim,
            flexible: self.csv.flexible,
            max_rows: self.csv.max_rows,
            validate_nip: self.extraction.validate_nip,
            default_currency: self.extraction.default_currency.clone(),
            progress_interval: self.processing.progress_interval.max(1),
            continue_on_error: self.processing.continue_on_error,
            on_progress: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CsvInvConfig =
            serde_json::from_str(r#"{ "csv": { "delimiter": ";" } }"#).unwrap();

        assert_eq!(config.csv.delimiter, ';');
        assert!(config.csv.has_headers);
        assert_eq!(config.extraction.default_currency, "PLN");
        assert_eq!(config.processing.progress_interval, 100);
    }

    #[test]
    fn test_parse_options_from_config() {
        let mut config = CsvInvConfig::default();
        config.csv.delimiter = ';';
        config.extraction.validate_nip = false;
        config.processing.progress_interval = 0;
        config.processing.continue_on_error = false;

        let options = config.parse_options().unwrap();
        assert_eq!(options.delimiter, b';');
        assert!(!options.validate_nip);
        assert_eq!(options.progress_interval, 1);
        assert!(!options.continue_on_error);
        assert!(options.on_progress.is_none());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let mut config = CsvInvConfig::default();
        config.csv.delimiter = '§';

        assert!(matches!(config.parse_options(), Err(CsvInvError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CsvInvConfig::default();
        config.csv.max_rows = 500;
        config.save(&path).unwrap();

        let loaded = CsvInvConfig::from_file(&path).unwrap();
        assert_eq!(loaded.csv.max_rows, 500);
    }
}
