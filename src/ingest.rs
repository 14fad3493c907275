//! Batch ingestion of tide files into the repository.
//!
//! Drives discovery, optional in-place cleaning, file reading and the
//! transactional load of each file. A failing file is recorded in the
//! [`IngestReport`] and the batch moves on; because each file loads in a
//! single transaction, a failure leaves nothing from that file behind.

use crate::clean::{clean_tide_file, CleanOutcome};
use crate::config::IngestConfig;
use crate::error::{Result, TideError};
use crate::models::{FailedFile, IngestReport, LoadedFile};
use crate::reader::TideFileReader;
use crate::repository::TideRepository;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Find tide files directly inside `input_dir`, skipping backup copies.
///
/// Files are returned sorted by name so batches load in a stable order.
pub fn discover_tide_files(input_dir: &Path, config: &IngestConfig) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(TideError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory not found: {}", input_dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && is_tide_file(entry.path(), config) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(
        "Found {} tide files in {}",
        files.len(),
        input_dir.display()
    );
    Ok(files)
}

fn is_tide_file(path: &Path, config: &IngestConfig) -> bool {
    path.extension()
        .is_some_and(|extension| extension == config.file_extension.as_str())
}

/// Loads batches of tide files into a [`TideRepository`]
pub struct TideIngestor<'a> {
    repository: &'a mut TideRepository,
    reader: TideFileReader,
    config: IngestConfig,
}

impl<'a> TideIngestor<'a> {
    /// Create an ingestor with the default configuration
    pub fn new(repository: &'a mut TideRepository) -> Result<Self> {
        Self::with_config(repository, IngestConfig::default())
    }

    pub fn with_config(repository: &'a mut TideRepository, config: IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            reader: TideFileReader::from_config(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Discover and ingest every tide file in a directory
    pub fn ingest_directory(&mut self, input_dir: &Path) -> Result<IngestReport> {
        let files = discover_tide_files(input_dir, &self.config)?;
        info!(
            "Ingesting {} tide files from {}",
            files.len(),
            input_dir.display()
        );
        Ok(self.ingest(&files))
    }

    /// Ingest each file in turn, collecting per-file failures
    pub fn ingest(&mut self, file_paths: &[PathBuf]) -> IngestReport {
        let start_time = Instant::now();
        let mut report = IngestReport::default();

        let pb = self.progress_bar(file_paths.len());

        for file_path in file_paths {
            if let Some(file_name) = file_path.file_name() {
                pb.set_message(format!("Loading: {}", file_name.to_string_lossy()));
            }

            match self.ingest_file(file_path) {
                Ok(loaded) => {
                    debug!(
                        "Loaded {} rows for site {} from {}",
                        loaded.rows_inserted,
                        loaded.site_code,
                        file_path.display()
                    );
                    report.total_rows += loaded.rows_inserted;
                    report.loaded.push(loaded);
                }
                Err(e) => {
                    error!("Failed to ingest {}: {}", file_path.display(), e);
                    report.failed.push(FailedFile {
                        path: file_path.clone(),
                        error: e,
                    });
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("All tide files processed");
        report.processing_time_ms = start_time.elapsed().as_millis();

        info!(
            "Ingestion finished: {} loaded, {} failed, {} rows",
            report.loaded.len(),
            report.failed.len(),
            report.total_rows
        );
        report
    }

    /// Read one file and load it in a single transaction
    pub fn ingest_file(&mut self, file_path: &Path) -> Result<LoadedFile> {
        if self.config.clean_in_place {
            let outcome =
                clean_tide_file(file_path, self.reader.filter(), &self.config.backup_suffix)?;
            if let CleanOutcome::Cleaned { lines_removed, .. } = outcome {
                debug!(
                    "Cleaned {} lines from {} before reading",
                    lines_removed,
                    file_path.display()
                );
            }
        }

        let tide_file = self.reader.read(file_path)?;
        let loaded = self.repository.load_tide_file(&tide_file)?;

        Ok(LoadedFile {
            path: file_path.to_path_buf(),
            site_code: tide_file.metadata.code,
            site_id: loaded.site_id,
            rows_inserted: loaded.rows_inserted,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Loading tide files");
        pb
    }
}

#[cfg(test)]
mod tests;
