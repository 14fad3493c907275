//! Configuration management and validation.
//!
//! Provides the ingestion settings shared by the reader, the cleaner,
//! and the orchestrator, with defaults matching the BODC annual file
//! layout.

use crate::constants::{BACKUP_SUFFIX, DEFAULT_HEADER_LENGTH, TIDE_FILE_EXTENSION};
use crate::error::{Result, TideError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings for a tide-file ingestion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Number of header lines before the data rows
    pub header_length: usize,

    /// Extension of the files picked up from an input directory
    pub file_extension: String,

    /// Suffix of backup copies written when cleaning in place
    pub backup_suffix: String,

    /// Rewrite source files without trailing junk before reading them
    pub clean_in_place: bool,

    /// Show a progress bar while ingesting
    pub show_progress: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_length: DEFAULT_HEADER_LENGTH,
            file_extension: TIDE_FILE_EXTENSION.to_string(),
            backup_suffix: BACKUP_SUFFIX.to_string(),
            clean_in_place: false,
            show_progress: true,
        }
    }
}

impl IngestConfig {
    /// Create configuration with a custom header length
    pub fn with_header_length(mut self, header_length: usize) -> Self {
        self.header_length = header_length;
        self
    }

    /// Enable in-place cleaning (with backups) before reading
    pub fn with_clean_in_place(mut self) -> Self {
        self.clean_in_place = true;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.header_length == 0 {
            return Err(TideError::configuration(
                "header_length must be at least 1: site coordinates live in the header",
            ));
        }
        if self.file_extension.is_empty() {
            return Err(TideError::configuration("file_extension must not be empty"));
        }
        if self.backup_suffix.is_empty() || self.backup_suffix == self.file_extension {
            return Err(TideError::configuration(format!(
                "backup_suffix '{}' must be non-empty and differ from the file extension",
                self.backup_suffix
            )));
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.header_length, 11);
        assert_eq!(config.file_extension, "txt");
        assert_eq!(config.backup_suffix, "bak");
        assert!(!config.clean_in_place);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = IngestConfig::default()
            .with_header_length(9)
            .with_clean_in_place()
            .without_progress();
        assert_eq!(config.header_length, 9);
        assert!(config.clean_in_place);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_validation_failures() {
        let zero_header = IngestConfig::default().with_header_length(0);
        assert!(matches!(
            zero_header.validate(),
            Err(TideError::Configuration { .. })
        ));

        let clashing = IngestConfig {
            backup_suffix: "txt".to_string(),
            ..Default::default()
        };
        assert!(clashing.validate().is_err());
    }
}
