//! Integration tests for the ingest module
//!
//! Exercises the complete pipeline against temporary tide file directories
//! and an in-memory database.

pub mod basic_ingest;

use std::fs;
use std::path::{Path, PathBuf};

/// Build a BODC-style annual file for the given coordinates and rows
pub fn tide_file_contents(site: &str, lat: f64, lon: f64, rows: &[&str]) -> String {
    let mut contents = format!(
        "Port:              P001
Site:              {site}
Latitude:          {lat}
Longitude:         {lon}
Start Date:        01JAN1999-00.00.00
End Date:          31DEC1999-23.45.00
Contributor:       National Oceanography Centre, Liverpool
Datum information: The data refer to Admiralty Chart Datum (ACD)
Parameter code:    ASLVTG02 = Surface elevation (unspecified datum) of the water body
  Cycle    Date      Time    ASLVTG02   Residual
 Number yyyy mm dd hh mi ssf         f          f
"
    );
    for (index, row) in rows.iter().enumerate() {
        contents.push_str(&format!("{:>6}) {}\n", index + 1, row));
    }
    contents
}

pub fn write_tide_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub const ROWS: &[&str] = &[
    "1999/01/01 00:00:00     4.1790      0.0830",
    "1999/01/01 00:15:00     4.0120M     0.0910",
    "1999/01/01 00:30:00   -99.0000N   -99.0000N",
];
