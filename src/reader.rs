//! Reading BODC annual tide-gauge files.
//!
//! A file is a fixed-length header block followed by data rows of the form
//! `<index> <YYYY/MM/DD> <HH:MM:SS> <elevation[flag]> <residual[flag]>`.
//! Trailing annotations after the data are filtered out in memory; the
//! source file is never modified here (see [`crate::clean`] for the
//! in-place variant).

use crate::config::IngestConfig;
use crate::constants::DATA_LINE_PATTERN;
use crate::error::{Result, TideError};
use crate::header::parse_tide_header;
use crate::models::{ObservationRecord, TideFile};
use crate::observation::parse_observation;
use crate::time_codec::{parse_timestamp, to_epoch};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Decides which lines after the header block are data rows
#[derive(Debug, Clone)]
pub struct DataLineFilter {
    header_length: usize,
    pattern: Regex,
}

impl DataLineFilter {
    pub fn new(header_length: usize) -> Result<Self> {
        let pattern = Regex::new(DATA_LINE_PATTERN)
            .map_err(|e| TideError::configuration(format!("Invalid data line pattern: {}", e)))?;
        Ok(Self {
            header_length,
            pattern,
        })
    }

    pub fn header_length(&self) -> usize {
        self.header_length
    }

    /// Whether the zero-based `index`-th line of a file is kept
    pub fn retains(&self, index: usize, line: &str) -> bool {
        index < self.header_length || self.pattern.is_match(line)
    }
}

/// Parser for one site-year tide file
#[derive(Debug, Clone)]
pub struct TideFileReader {
    filter: DataLineFilter,
}

impl TideFileReader {
    /// Create a reader for files with the given header length
    pub fn new(header_length: usize) -> Result<Self> {
        Ok(Self {
            filter: DataLineFilter::new(header_length)?,
        })
    }

    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Self::new(config.header_length)
    }

    pub fn header_length(&self) -> usize {
        self.filter.header_length()
    }

    pub fn filter(&self) -> &DataLineFilter {
        &self.filter
    }

    /// Read and normalize a tide file from disk
    pub fn read(&self, file_path: &Path) -> Result<TideFile> {
        let contents = fs::read_to_string(file_path)?;
        self.parse_str(file_path, &contents)
    }

    /// Normalize the contents of a tide file; `file_path` supplies the site code
    pub fn parse_str(&self, file_path: &Path, contents: &str) -> Result<TideFile> {
        let header_length = self.header_length();
        let lines: Vec<&str> = contents.lines().collect();

        if lines.len() < header_length {
            return Err(TideError::header_parse(
                file_path,
                format!(
                    "File has {} lines but the header block is {} lines",
                    lines.len(),
                    header_length
                ),
            ));
        }

        let metadata = parse_tide_header(file_path, &lines[..header_length])?;

        let mut records = Vec::with_capacity(lines.len() - header_length);
        let mut skipped = 0usize;
        for (index, line) in lines.iter().enumerate().skip(header_length) {
            if !self.filter.retains(index, line) {
                skipped += 1;
                continue;
            }
            records.push(parse_row(file_path, index + 1, line)?);
        }

        if skipped > 0 {
            debug!(
                "Ignored {} non-data lines after the header of {}",
                skipped,
                file_path.display()
            );
        }
        if records.is_empty() {
            warn!("No data rows found in {}", file_path.display());
        }

        debug!(
            "Read {} observations for site {} from {}",
            records.len(),
            metadata.code,
            file_path.display()
        );

        Ok(TideFile {
            path: file_path.to_path_buf(),
            metadata,
            records,
        })
    }
}

/// Read a tide file with the given header length
pub fn read_tide_file(file_path: &Path, header_length: usize) -> Result<TideFile> {
    TideFileReader::new(header_length)?.read(file_path)
}

/// Parse one data row; `line_number` is 1-based and used for diagnostics
fn parse_row(file_path: &Path, line_number: usize, line: &str) -> Result<ObservationRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(TideError::malformed_row(
            file_path,
            line_number,
            line.trim(),
            format!("expected 5 fields, found {}", tokens.len()),
        ));
    }

    let wrap = |source: TideError| TideError::row_parse(file_path, line_number, line.trim(), source);

    let timestamp = parse_timestamp(tokens[1], tokens[2]).map_err(wrap)?;
    let (elevation, elevation_flag) = parse_observation(tokens[3]).map_err(wrap)?;
    let (residual, residual_flag) = parse_observation(tokens[4]).map_err(wrap)?;

    Ok(ObservationRecord {
        time: to_epoch(timestamp),
        elevation,
        elevation_flag,
        residual,
        residual_flag,
    })
}
