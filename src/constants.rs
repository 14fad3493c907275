//! Application constants for the BODC tide loader
//!
//! This module contains file-format constants, default values,
//! and the fixed quality flag lookup used throughout the crate.

// =============================================================================
// Source File Format
// =============================================================================

/// Number of header lines preceding the data rows in a BODC annual file
pub const DEFAULT_HEADER_LENGTH: usize = 11;

/// Extension of raw tide-gauge observation files
pub const TIDE_FILE_EXTENSION: &str = "txt";

/// Suffix appended to the original file when cleaning in place
pub const BACKUP_SUFFIX: &str = "bak";

/// Date-time format of the date and time tokens of a data row
pub const ROW_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Substring identifying the longitude header line
pub const LONGITUDE_LABEL: &str = "ongitude";

/// Substring identifying the latitude header line
pub const LATITUDE_LABEL: &str = "atitude";

/// Substring identifying the site name header line
pub const SITE_LABEL: &str = "Site";

/// Pattern a retained data line must match
pub const DATA_LINE_PATTERN: &str = r"^\s+[0-9]";

/// Character range (0-indexed, exclusive end) of the site code in a file name
pub const SITE_CODE_START: usize = 4;
pub const SITE_CODE_END: usize = 7;

// =============================================================================
// Database
// =============================================================================

/// Extension appended to database targets that lack it
pub const DATABASE_EXTENSION: &str = "db";

/// Mean Earth radius used for haversine distances, in metres
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

// =============================================================================
// Quality Control Constants
// =============================================================================

/// Quality flag rows seeded into the `quality_flag` table
pub mod quality_flags {
    /// Value passed QC
    pub const NO_ERROR: i64 = 0;

    /// Improbable value flagged by QC
    pub const IMPROBABLE: i64 = 1;

    /// Null value
    pub const NULL_VALUE: i64 = 2;

    /// Value interpolated from adjacent values
    pub const INTERPOLATED: i64 = 3;

    /// (id, code, description) of every flag, in id order
    pub const SEED_ROWS: &[(i64, &str, &str)] = &[
        (NO_ERROR, "", "No error"),
        (IMPROBABLE, "M", "Improbable value flagged by QC"),
        (NULL_VALUE, "N", "Null Value"),
        (INTERPOLATED, "T", "Value interpolated from adjacent values"),
    ];
}
