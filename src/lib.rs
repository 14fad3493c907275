//! BODC Tide Database Library
//!
//! A Rust library for loading British Oceanographic Data Centre (BODC)
//! tide-gauge observation files into a SQLite database and retrieving
//! elevation series from it.
//!
//! This library provides tools for:
//! - Parsing observation tokens with fused quality flags (`4.0120M`)
//! - Reading annual site files: header metadata, site codes and data rows
//! - Cleaning trailing annotations from source files with reversible backups
//! - Deduplicating sites and bulk-loading observations transactionally
//! - Querying elevation series by site and time window
//! - Finding the gauge nearest to a coordinate

pub mod clean;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod header;
pub mod ingest;
pub mod models;
pub mod observation;
pub mod reader;
pub mod repository;
pub mod time_codec;

// Re-export commonly used types
pub use config::IngestConfig;
pub use error::{Result, TideError};
pub use ingest::{discover_tide_files, TideIngestor};
pub use models::{
    IngestReport, NearestSite, ObservationRecord, QualityFlag, SeriesPoint, Site, SiteIdentifier,
    SiteMetadata, TideFile, TideSeries,
};
pub use observation::parse_observation;
pub use reader::{read_tide_file, TideFileReader};
pub use repository::TideRepository;
pub use time_codec::{from_epoch, to_epoch};
