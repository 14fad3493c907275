//! BODC tide file header parsing and site metadata extraction.
//!
//! Parses the fixed-length header block of an annual tide-gauge file to
//! extract site coordinates and display name, and derives the three-letter
//! site code from the file name.

use crate::constants::{
    LATITUDE_LABEL, LONGITUDE_LABEL, SITE_CODE_END, SITE_CODE_START, SITE_LABEL,
};
use crate::error::{Result, TideError};
use crate::models::SiteMetadata;
use std::path::Path;
use tracing::{debug, warn};

/// Extract site metadata from the header lines of a tide file
pub fn parse_tide_header(file_path: &Path, header_lines: &[&str]) -> Result<SiteMetadata> {
    let mut metadata = SiteMetadataBuilder::new();

    for line in header_lines {
        metadata.parse_line(line);
    }

    let code = site_code_from_path(file_path)?;
    let site = metadata.build(file_path, code)?;

    debug!(
        "Parsed header for {}: code={}, name='{}', lon={}, lat={}",
        file_path.display(),
        site.code,
        site.name,
        site.lon,
        site.lat
    );

    Ok(site)
}

/// Derive the three-letter site code from characters 5-7 of the file stem
pub fn site_code_from_path(file_path: &Path) -> Result<String> {
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let code: String = stem
        .chars()
        .skip(SITE_CODE_START)
        .take(SITE_CODE_END - SITE_CODE_START)
        .collect();

    if code.len() != SITE_CODE_END - SITE_CODE_START
        || !code.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(TideError::InvalidFilename { file_name });
    }

    Ok(code)
}

/// Builder for site metadata extraction
struct SiteMetadataBuilder {
    name: Option<String>,
    lon: Option<f64>,
    lat: Option<f64>,
}

impl SiteMetadataBuilder {
    fn new() -> Self {
        Self {
            name: None,
            lon: None,
            lat: None,
        }
    }

    fn parse_line(&mut self, line: &str) {
        // A later occurrence of a label overrides an earlier one
        if line.contains(LONGITUDE_LABEL) {
            match first_number(line) {
                Some(lon) => self.lon = Some(lon),
                None => warn!("Longitude line has no numeric value: {}", line.trim()),
            }
        }
        if line.contains(LATITUDE_LABEL) {
            match first_number(line) {
                Some(lat) => self.lat = Some(lat),
                None => warn!("Latitude line has no numeric value: {}", line.trim()),
            }
        }
        if line.contains(SITE_LABEL) {
            self.name = Some(line.split_whitespace().skip(1).collect::<String>());
        }
    }

    fn build(self, file_path: &Path, code: String) -> Result<SiteMetadata> {
        let lon = self
            .lon
            .ok_or_else(|| TideError::header_parse(file_path, "Missing or invalid longitude"))?;

        let lat = self
            .lat
            .ok_or_else(|| TideError::header_parse(file_path, "Missing or invalid latitude"))?;

        Ok(SiteMetadata {
            code,
            name: self.name.unwrap_or_default(),
            lon,
            lat,
        })
    }
}

/// First whitespace-delimited token of a line that parses as a number
fn first_number(line: &str) -> Option<f64> {
    line.split_whitespace()
        .find_map(|token| token.parse::<f64>().ok())
}
