//! In-place removal of trailing junk from tide files.
//!
//! Some published files carry annotations after the data rows. Cleaning
//! keeps the header block plus every line that starts with whitespace
//! followed by a digit, after first copying the original to
//! `<file>.<backup_suffix>`. The rewrite is atomic and [`restore_backup`]
//! reverses it.

use crate::error::Result;
use crate::reader::DataLineFilter;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Result of cleaning one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// Nothing to remove; the file and any backup were left untouched
    AlreadyClean,
    /// Lines were removed and the original is available at `backup_path`
    Cleaned {
        lines_removed: usize,
        backup_path: PathBuf,
    },
}

/// Path of the backup copy for a tide file
pub fn backup_path(file_path: &Path, backup_suffix: &str) -> PathBuf {
    let mut name: OsString = file_path.as_os_str().to_owned();
    name.push(".");
    name.push(backup_suffix);
    PathBuf::from(name)
}

/// Remove non-data lines after the header, keeping a backup of the original.
///
/// Idempotent: a file with nothing to remove is not rewritten. An existing
/// backup is never overwritten, so the first original always survives.
pub fn clean_tide_file(
    file_path: &Path,
    filter: &DataLineFilter,
    backup_suffix: &str,
) -> Result<CleanOutcome> {
    let contents = fs::read_to_string(file_path)?;

    let mut kept = String::with_capacity(contents.len());
    let mut lines_removed = 0usize;
    for (index, line) in contents.lines().enumerate() {
        if filter.retains(index, line) {
            kept.push_str(line);
            kept.push('\n');
        } else {
            lines_removed += 1;
        }
    }

    if lines_removed == 0 {
        debug!("{} is already clean", file_path.display());
        return Ok(CleanOutcome::AlreadyClean);
    }

    let backup = backup_path(file_path, backup_suffix);
    if backup.exists() {
        debug!("Keeping existing backup {}", backup.display());
    } else {
        fs::copy(file_path, &backup)?;
    }

    let directory = file_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(directory)?;
    staged.write_all(kept.as_bytes())?;
    // The staged file is created 0600; carry the original mode across
    fs::set_permissions(staged.path(), fs::metadata(file_path)?.permissions())?;
    staged.persist(file_path).map_err(|e| e.error)?;

    info!(
        "Removed {} non-data lines from {} (original kept at {})",
        lines_removed,
        file_path.display(),
        backup.display()
    );

    Ok(CleanOutcome::Cleaned {
        lines_removed,
        backup_path: backup,
    })
}

/// Put the backup copy back in place of a cleaned file.
///
/// Returns `false` when there is no backup to restore.
pub fn restore_backup(file_path: &Path, backup_suffix: &str) -> Result<bool> {
    let backup = backup_path(file_path, backup_suffix);
    if !backup.exists() {
        return Ok(false);
    }
    fs::rename(&backup, file_path)?;
    info!("Restored {} from backup", file_path.display());
    Ok(true)
}
