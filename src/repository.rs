//! SQLite persistence for tide-gauge sites and observations.
//!
//! A [`TideRepository`] owns one connection. Every statement is
//! parameterized; table names come from the closed [`Table`] enum and the
//! only variable clause, the site filter, from [`SiteIdentifier`].

use crate::constants::{quality_flags, DATABASE_EXTENSION};
use crate::error::{Result, TideError};
use crate::geo::haversine_distance;
use crate::models::{
    LoadedSite, NearestSite, ObservationRecord, QualityFlag, SeriesPoint, Site, SiteIdentifier,
    SiteMetadata, TideFile, TideSeries,
};
use crate::time_codec::{from_epoch, to_epoch};
use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tables owned by the repository, in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    QualityFlag,
    Site,
    Observation,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::QualityFlag, Table::Site, Table::Observation];

    pub fn name(self) -> &'static str {
        match self {
            Table::QualityFlag => "quality_flag",
            Table::Site => "site",
            Table::Observation => "observation",
        }
    }

    fn create_sql(self) -> &'static str {
        match self {
            Table::QualityFlag => {
                "CREATE TABLE IF NOT EXISTS quality_flag (
                    id INTEGER NOT NULL PRIMARY KEY,
                    code TEXT NOT NULL,
                    description TEXT NOT NULL
                )"
            }
            Table::Site => {
                "CREATE TABLE IF NOT EXISTS site (
                    id INTEGER NOT NULL PRIMARY KEY,
                    code TEXT NOT NULL UNIQUE,
                    name TEXT,
                    lon REAL,
                    lat REAL,
                    notes TEXT
                )"
            }
            Table::Observation => {
                "CREATE TABLE IF NOT EXISTS observation (
                    site_id INTEGER NOT NULL,
                    time INTEGER NOT NULL,
                    elevation REAL NOT NULL,
                    elevation_flag INTEGER,
                    residual REAL,
                    residual_flag INTEGER,
                    PRIMARY KEY (site_id, time),
                    FOREIGN KEY (site_id) REFERENCES site(id),
                    FOREIGN KEY (elevation_flag) REFERENCES quality_flag(id),
                    FOREIGN KEY (residual_flag) REFERENCES quality_flag(id)
                )"
            }
        }
    }
}

const SERIES_BY_CODE_SQL: &str = "SELECT o.time, o.elevation, o.elevation_flag
    FROM observation AS o
    INNER JOIN site AS s ON s.id = o.site_id
    WHERE s.code = ?1
      AND (?2 IS NULL OR o.time >= ?2)
      AND (?3 IS NULL OR o.time <= ?3)
    ORDER BY o.time";

const SERIES_BY_ID_SQL: &str = "SELECT o.time, o.elevation, o.elevation_flag
    FROM observation AS o
    INNER JOIN site AS s ON s.id = o.site_id
    WHERE s.id = ?1
      AND (?2 IS NULL OR o.time >= ?2)
      AND (?3 IS NULL OR o.time <= ?3)
    ORDER BY o.time";

impl ToSql for QualityFlag {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.id()))
    }
}

impl FromSql for QualityFlag {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let id = i64::column_result(value)?;
        QualityFlag::from_id(id).ok_or(FromSqlError::OutOfRange(id))
    }
}

/// Database path for a target name, appending `.db` when absent
pub fn database_path(target: impl AsRef<Path>) -> PathBuf {
    let target = target.as_ref();
    if target
        .extension()
        .is_some_and(|extension| extension == DATABASE_EXTENSION)
    {
        return target.to_path_buf();
    }
    let mut name: OsString = target.as_os_str().to_owned();
    name.push(".");
    name.push(DATABASE_EXTENSION);
    PathBuf::from(name)
}

/// Relational store of tide-gauge sites and observations
#[derive(Debug)]
pub struct TideRepository {
    connection: Connection,
}

impl TideRepository {
    /// Open (or create) the database named by `target`
    pub fn open(target: impl AsRef<Path>) -> Result<Self> {
        let path = database_path(target);
        debug!("Opening tide database {}", path.display());
        Self::from_connection(Connection::open(&path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, enabling foreign key enforcement
    pub fn from_connection(connection: Connection) -> Result<Self> {
        connection.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Create the tables and seed the quality flag lookup. Safe to repeat.
    pub fn initialize_schema(&mut self) -> Result<()> {
        let transaction = self.connection.transaction()?;

        for table in Table::ALL {
            transaction.execute(table.create_sql(), [])?;
        }

        {
            let mut seed = transaction.prepare(
                "INSERT OR IGNORE INTO quality_flag (id, code, description) VALUES (?1, ?2, ?3)",
            )?;
            for (id, code, description) in quality_flags::SEED_ROWS {
                seed.execute(params![id, code, description])?;
            }
        }

        transaction.commit()?;
        info!("Tide database schema initialized");
        Ok(())
    }

    /// Id of the site with `site.code`, creating the site if it is new.
    ///
    /// Runs in an IMMEDIATE transaction so the id read and the insert happen
    /// under SQLite's write lock.
    pub fn resolve_or_create_site(&mut self, site: &SiteMetadata) -> Result<i64> {
        let transaction = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (site_id, _) = resolve_site(&transaction, site)?;
        transaction.commit()?;
        Ok(site_id)
    }

    /// Insert all records for one site as a single all-or-nothing batch
    pub fn bulk_insert_observations(
        &mut self,
        site_id: i64,
        records: &[ObservationRecord],
    ) -> Result<usize> {
        let transaction = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = insert_observations(&transaction, site_id, records)?;
        transaction.commit()?;
        Ok(inserted)
    }

    /// Resolve the site and insert the records of one file in one transaction.
    ///
    /// On any error nothing from the file is kept, including a newly
    /// created site.
    pub fn load_tide_file(&mut self, file: &TideFile) -> Result<LoadedSite> {
        let transaction = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (site_id, created) = resolve_site(&transaction, &file.metadata)?;
        let rows_inserted = insert_observations(&transaction, site_id, &file.records)?;
        transaction.commit()?;

        Ok(LoadedSite {
            site_id,
            created,
            rows_inserted,
        })
    }

    /// Elevation series for a site within an optional inclusive time window.
    ///
    /// Returns `None` when no observation matches, including when
    /// `start > end`.
    pub fn query_series(
        &self,
        site: impl Into<SiteIdentifier>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Option<TideSeries>> {
        let site = site.into();
        let start_sec = start.map(to_epoch);
        let end_sec = end.map(to_epoch);

        let mut statement = match &site {
            SiteIdentifier::Code(_) => self.connection.prepare(SERIES_BY_CODE_SQL)?,
            SiteIdentifier::Id(_) => self.connection.prepare(SERIES_BY_ID_SQL)?,
        };
        let site_param: &dyn ToSql = match &site {
            SiteIdentifier::Code(code) => code,
            SiteIdentifier::Id(id) => id,
        };

        let rows = statement
            .query_map(params![site_param, start_sec, end_sec], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, Option<QualityFlag>>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if rows.is_empty() {
            info!("No data available for site {:?}", site);
            return Ok(None);
        }

        let points = rows
            .into_iter()
            .map(|(time, elevation, flag)| {
                Ok(SeriesPoint {
                    time: from_epoch(time)?,
                    elevation,
                    // A missing flag means none was recorded
                    elevation_flag: flag.unwrap_or(QualityFlag::NoError),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(TideSeries { points }))
    }

    /// Closest site to a coordinate by great-circle distance.
    ///
    /// Sites are scanned in id order and the first of equally distant sites
    /// wins. Sites without coordinates are skipped. Non-finite input
    /// coordinates are rejected.
    pub fn nearest_site(&self, lat: f64, lon: f64) -> Result<NearestSite> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(TideError::InvalidCoordinate { lat, lon });
        }

        let mut statement = self
            .connection
            .prepare("SELECT id, lat, lon FROM site ORDER BY id")?;
        let candidates = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut nearest: Option<NearestSite> = None;
        for (site_id, site_lat, site_lon) in candidates {
            let (Some(site_lat), Some(site_lon)) = (site_lat, site_lon) else {
                continue;
            };
            let distance_m = haversine_distance(lat, lon, site_lat, site_lon);
            if nearest.is_none_or(|best| distance_m < best.distance_m) {
                nearest = Some(NearestSite {
                    site_id,
                    distance_m,
                });
            }
        }

        nearest.ok_or(TideError::NoSites)
    }

    /// All sites in id order
    pub fn sites(&self) -> Result<Vec<Site>> {
        let mut statement = self
            .connection
            .prepare("SELECT id, code, name, lon, lat, notes FROM site ORDER BY id")?;
        let sites = statement
            .query_map([], site_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sites)
    }

    pub fn site_by_code(&self, code: &str) -> Result<Option<Site>> {
        let site = self
            .connection
            .query_row(
                "SELECT id, code, name, lon, lat, notes FROM site WHERE code = ?1",
                [code],
                site_from_row,
            )
            .optional()?;
        Ok(site)
    }

    /// Rows of the quality flag lookup as (id, code, description)
    pub fn quality_flags(&self) -> Result<Vec<(i64, String, String)>> {
        let mut statement = self
            .connection
            .prepare("SELECT id, code, description FROM quality_flag ORDER BY id")?;
        let flags = statement
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(flags)
    }

    pub fn observation_count(&self, site_id: i64) -> Result<usize> {
        let count: i64 = self.connection.query_row(
            "SELECT COUNT(*) FROM observation WHERE site_id = ?1",
            [site_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.connection.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn site_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        lon: row.get(3)?,
        lat: row.get(4)?,
        notes: row.get(5)?,
    })
}

/// Look up a site by code, inserting it with the next free id if absent
fn resolve_site(transaction: &Transaction<'_>, site: &SiteMetadata) -> Result<(i64, bool)> {
    let existing: Option<i64> = transaction
        .query_row(
            "SELECT id FROM site WHERE code = ?1",
            [&site.code],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(site_id) = existing {
        debug!("Site {} already has id {}", site.code, site_id);
        return Ok((site_id, false));
    }

    let max_id: Option<i64> =
        transaction.query_row("SELECT MAX(id) FROM site", [], |row| row.get(0))?;
    let site_id = max_id.map_or(1, |max| max + 1);

    transaction.execute(
        "INSERT INTO site (id, code, name, lon, lat, notes) VALUES (?1, ?2, ?3, ?4, ?5, '')",
        params![site_id, site.code, site.name, site.lon, site.lat],
    )?;

    info!(
        "Created site {} ({}) with id {}",
        site.code, site.name, site_id
    );
    Ok((site_id, true))
}

fn insert_observations(
    transaction: &Transaction<'_>,
    site_id: i64,
    records: &[ObservationRecord],
) -> Result<usize> {
    let mut statement = transaction.prepare(
        "INSERT INTO observation
            (site_id, time, elevation, elevation_flag, residual, residual_flag)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for record in records {
        statement
            .execute(params![
                site_id,
                record.time,
                record.elevation,
                record.elevation_flag,
                record.residual,
                record.residual_flag,
            ])
            .map_err(|error| {
                if is_primary_key_violation(&error) {
                    TideError::DuplicateKey {
                        site_id,
                        time: record.time,
                    }
                } else {
                    TideError::Database(error)
                }
            })?;
    }

    debug!("Inserted {} observations for site {}", records.len(), site_id);
    Ok(records.len())
}

fn is_primary_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
