//! Core data structures and types for tide-gauge ingestion.
//!
//! Defines quality flags, site metadata, normalized observation records,
//! query results, and the ingestion report used throughout the library.

use crate::constants::quality_flags;
use crate::error::TideError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Quality flag attached to an elevation or residual value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityFlag {
    NoError,
    Improbable,
    Null,
    Interpolated,
}

impl QualityFlag {
    /// Every flag, in id order
    pub const ALL: [QualityFlag; 4] = [
        QualityFlag::NoError,
        QualityFlag::Improbable,
        QualityFlag::Null,
        QualityFlag::Interpolated,
    ];

    /// Map a trailing flag letter to its flag
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(QualityFlag::Improbable),
            'N' => Some(QualityFlag::Null),
            'T' => Some(QualityFlag::Interpolated),
            _ => None,
        }
    }

    /// Look up a flag by its stored id
    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.id() == id)
    }

    /// Identifier stored in the `quality_flag` table
    pub fn id(self) -> i64 {
        match self {
            QualityFlag::NoError => quality_flags::NO_ERROR,
            QualityFlag::Improbable => quality_flags::IMPROBABLE,
            QualityFlag::Null => quality_flags::NULL_VALUE,
            QualityFlag::Interpolated => quality_flags::INTERPOLATED,
        }
    }

    /// Single-character code as it appears in source files
    pub fn code(self) -> &'static str {
        match self {
            QualityFlag::NoError => "",
            QualityFlag::Improbable => "M",
            QualityFlag::Null => "N",
            QualityFlag::Interpolated => "T",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QualityFlag::NoError => "No error",
            QualityFlag::Improbable => "Improbable value flagged by QC",
            QualityFlag::Null => "Null Value",
            QualityFlag::Interpolated => "Value interpolated from adjacent values",
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Station metadata extracted from a tide file header and file name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub code: String,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// A persisted tide-gauge site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub code: String,
    pub name: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub notes: Option<String>,
}

/// One normalized data row of a tide file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationRecord {
    pub time: i64,
    pub elevation: f64,
    pub elevation_flag: QualityFlag,
    pub residual: f64,
    pub residual_flag: QualityFlag,
}

/// A parsed site-year file ready for loading
#[derive(Debug, Clone)]
pub struct TideFile {
    pub path: PathBuf,
    pub metadata: SiteMetadata,
    pub records: Vec<ObservationRecord>,
}

/// How a caller names a site when querying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteIdentifier {
    Code(String),
    Id(i64),
}

impl From<&str> for SiteIdentifier {
    fn from(code: &str) -> Self {
        SiteIdentifier::Code(code.to_string())
    }
}

impl From<String> for SiteIdentifier {
    fn from(code: String) -> Self {
        SiteIdentifier::Code(code)
    }
}

impl From<i64> for SiteIdentifier {
    fn from(id: i64) -> Self {
        SiteIdentifier::Id(id)
    }
}

/// One point of a retrieved elevation series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: NaiveDateTime,
    pub elevation: f64,
    pub elevation_flag: QualityFlag,
}

/// Non-empty elevation series ordered by ascending time
#[derive(Debug, Clone, PartialEq)]
pub struct TideSeries {
    pub points: Vec<SeriesPoint>,
}

impl TideSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn times(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.points.iter().map(|point| point.time)
    }
}

/// Result of a nearest-site lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestSite {
    pub site_id: i64,
    /// Great-circle distance in metres
    pub distance_m: f64,
}

/// Outcome of loading one tide file into the repository
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSite {
    pub site_id: i64,
    pub created: bool,
    pub rows_inserted: usize,
}

/// A file that was loaded successfully
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub site_code: String,
    pub site_id: i64,
    pub rows_inserted: usize,
}

/// A file that failed to ingest, with the reason
#[derive(Debug)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: TideError,
}

/// Summary of a batch ingestion
#[derive(Debug, Default)]
pub struct IngestReport {
    pub loaded: Vec<LoadedFile>,
    pub failed: Vec<FailedFile>,
    pub total_rows: usize,
    pub processing_time_ms: u128,
}

impl IngestReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn files_attempted(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }
}
