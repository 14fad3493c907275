//! Basic ingestion tests

use super::{tide_file_contents, write_tide_file, ROWS};
use crate::config::IngestConfig;
use crate::ingest::{discover_tide_files, TideIngestor};
use crate::models::QualityFlag;
use crate::repository::{Table, TideRepository};
use std::fs;
use tempfile::TempDir;

fn repository() -> TideRepository {
    let mut repository = TideRepository::open_in_memory().unwrap();
    repository.initialize_schema().unwrap();
    repository
}

fn quiet_config() -> IngestConfig {
    IngestConfig::default().without_progress()
}

#[test]
fn test_ingest_single_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tide_file(
        temp_dir.path(),
        "1999ABC.txt",
        &tide_file_contents("Somewhere", -4.456, 50.123, ROWS),
    );
    let mut repository = repository();

    let report = TideIngestor::with_config(&mut repository, quiet_config())
        .unwrap()
        .ingest(&[path.clone()]);

    assert!(!report.has_failures());
    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.loaded[0].site_code, "ABC");
    assert_eq!(report.loaded[0].site_id, 1);
    assert_eq!(report.total_rows, 3);

    let site = repository.site_by_code("ABC").unwrap().unwrap();
    assert_eq!(site.lon, Some(50.123));
    assert_eq!(site.lat, Some(-4.456));
    assert_eq!(site.name.as_deref(), Some("Somewhere"));

    let series = repository.query_series("ABC", None, None).unwrap().unwrap();
    let flags: Vec<QualityFlag> = series.points.iter().map(|p| p.elevation_flag).collect();
    assert_eq!(
        flags,
        vec![QualityFlag::NoError, QualityFlag::Improbable, QualityFlag::Null]
    );
}

#[test]
fn test_two_years_of_one_site_share_an_id() {
    let temp_dir = TempDir::new().unwrap();
    let first = write_tide_file(
        temp_dir.path(),
        "1999NEW.txt",
        &tide_file_contents("Newlyn", 50.103, -5.543, ROWS),
    );
    let second_rows = [
        "2000/01/01 00:00:00     3.9000      0.0100",
        "2000/01/01 00:15:00     3.8000      0.0200",
    ];
    let second = write_tide_file(
        temp_dir.path(),
        "2000NEW.txt",
        &tide_file_contents("Newlyn", 50.103, -5.543, &second_rows),
    );
    let mut repository = repository();

    let report = TideIngestor::with_config(&mut repository, quiet_config())
        .unwrap()
        .ingest(&[first, second]);

    assert_eq!(report.loaded.len(), 2);
    assert_eq!(report.loaded[0].site_id, report.loaded[1].site_id);
    assert_eq!(report.total_rows, 5);
    assert_eq!(repository.row_count(Table::Site).unwrap(), 1);
    assert_eq!(repository.observation_count(1).unwrap(), 5);
}

#[test]
fn test_ingest_directory_skips_backups_and_other_files() {
    let temp_dir = TempDir::new().unwrap();
    let contents = tide_file_contents("Newlyn", 50.103, -5.543, ROWS);
    write_tide_file(temp_dir.path(), "1999NEW.txt", &contents);
    write_tide_file(temp_dir.path(), "1999NEW.txt.bak", &contents);
    write_tide_file(temp_dir.path(), "README.md", "not a tide file");
    write_tide_file(
        temp_dir.path(),
        "1999LIV.txt",
        &tide_file_contents("Liverpool", 53.45, -3.018, ROWS),
    );

    let files = discover_tide_files(temp_dir.path(), &IngestConfig::default()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["1999LIV.txt", "1999NEW.txt"]);

    let mut repository = repository();
    let report = TideIngestor::with_config(&mut repository, quiet_config())
        .unwrap()
        .ingest_directory(temp_dir.path())
        .unwrap();

    assert_eq!(report.loaded.len(), 2);
    assert_eq!(report.total_rows, 6);
    // Sorted discovery order decides the ids
    assert_eq!(repository.site_by_code("LIV").unwrap().unwrap().id, 1);
    assert_eq!(repository.site_by_code("NEW").unwrap().unwrap().id, 2);
}

#[test]
fn test_clean_in_place_before_reading() {
    let temp_dir = TempDir::new().unwrap();
    let clean = tide_file_contents("Newlyn", 50.103, -5.543, ROWS);
    let dirty = format!("{}End of data\nQC notes follow\n", clean);
    let path = write_tide_file(temp_dir.path(), "1999NEW.txt", &dirty);

    let mut repository = repository();
    let report = TideIngestor::with_config(&mut repository, quiet_config().with_clean_in_place())
        .unwrap()
        .ingest(&[path.clone()]);

    assert!(!report.has_failures());
    assert_eq!(report.total_rows, 3);
    assert_eq!(fs::read_to_string(&path).unwrap(), clean);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("1999NEW.txt.bak")).unwrap(),
        dirty
    );
}

#[test]
fn test_custom_header_length() {
    let temp_dir = TempDir::new().unwrap();
    let contents = "Site: Short\nLatitude: 54.1\nLongitude: -4.8\n \
1) 1999/01/01 00:00:00 1.0 0.0\n 2) 1999/01/01 00:15:00 1.1T 0.1\n";
    let path = write_tide_file(temp_dir.path(), "1999SHT.txt", contents);

    let mut repository = repository();
    let report = TideIngestor::with_config(&mut repository, quiet_config().with_header_length(3))
        .unwrap()
        .ingest(&[path]);

    assert!(!report.has_failures());
    assert_eq!(report.total_rows, 2);
}
