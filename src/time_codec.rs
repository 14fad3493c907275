//! Conversion between calendar timestamps and epoch seconds.
//!
//! Observation times are stored as whole seconds since
//! 1970-01-01T00:00:00. All values are naive UTC; no timezone
//! conversion is performed.

use crate::constants::ROW_DATETIME_FORMAT;
use crate::error::{Result, TideError};
use chrono::{DateTime, NaiveDateTime};

/// Seconds since the Unix epoch, floored to a whole second
pub fn to_epoch(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp()
}

/// Inverse of [`to_epoch`]
pub fn from_epoch(seconds: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0)
        .map(|datetime| datetime.naive_utc())
        .ok_or_else(|| TideError::TimestampOutOfRange {
            message: format!("{} seconds from epoch", seconds),
        })
}

/// Parse the `YYYY/MM/DD` and `HH:MM:SS` tokens of a data row
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let joined = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&joined, ROW_DATETIME_FORMAT).map_err(|e| {
        TideError::InvalidTimestamp {
            reason: format!("expected YYYY/MM/DD HH:MM:SS ({})", e),
            value: joined.clone(),
        }
    })
}
