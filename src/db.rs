use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::bands::{self, FloorLevel, LeaseBand};
use crate::ingest::SourceType;

/// A single HDB resale transaction.
/// Field names match the dataset headers exactly, so the same struct
/// deserializes from the historical CSV and serializes back out on export.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResaleRecord {
    /// Transaction month, "YYYY-MM"
    pub month: String,

    /// HDB town, upper-case ("ANG MO KIO")
    pub town: String,

    /// Flat type label ("4 ROOM", "EXECUTIVE", ...)
    pub flat_type: String,

    pub block: String,

    pub street_name: String,

    /// Storey band string, e.g. "04 TO 06"
    pub storey_range: String,

    pub floor_area_sqm: f64,

    pub flat_model: String,

    /// Year the 99-year lease commenced
    pub lease_commence_date: i32,

    /// Free-text remaining lease, e.g. "61 years 04 months"
    pub remaining_lease: String,

    pub resale_price: f64,
}

impl ResaleRecord {
    /// Compute idempotency hash for duplicate detection.
    /// The dataset has no row id; the two sources can overlap on recent
    /// months, so identity is the full set of identifying fields.
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}{}{}{}{}{}{}{}",
            self.month,
            self.town,
            self.flat_type,
            self.block,
            self.street_name,
            self.storey_range,
            self.floor_area_sqm,
            self.resale_price,
        ));
        format!("{:x}", hasher.finalize())
    }

    /// Transaction year parsed from the month column ("2024-11" → 2024)
    pub fn year(&self) -> Option<i32> {
        bands::year_of_month(&self.month)
    }

    /// Floor band derived from the storey range midpoint
    pub fn floor_level(&self) -> FloorLevel {
        FloorLevel::from_storey_range(&self.storey_range)
    }

    /// Remaining lease in whole years, if the text parses
    pub fn lease_years(&self) -> Option<u32> {
        bands::extract_lease_years(&self.remaining_lease)
    }

    /// Remaining-lease bucket
    pub fn lease_band(&self) -> LeaseBand {
        LeaseBand::from_years(self.lease_years())
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS resale_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            idempotency_hash TEXT UNIQUE NOT NULL,
            month TEXT NOT NULL,
            town TEXT NOT NULL,
            flat_type TEXT NOT NULL,
            block TEXT NOT NULL,
            street_name TEXT NOT NULL,
            storey_range TEXT NOT NULL,
            floor_area_sqm REAL NOT NULL,
            flat_model TEXT NOT NULL,
            lease_commence_date INTEGER NOT NULL,
            remaining_lease TEXT NOT NULL,
            resale_price REAL NOT NULL,
            source TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Ingest log (one row per import/fetch run)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS ingest_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            fetched_at TEXT NOT NULL,
            record_count INTEGER NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_idempotency_hash ON resale_transactions(idempotency_hash)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_month ON resale_transactions(month)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_town ON resale_transactions(town)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_flat_type ON resale_transactions(flat_type)",
        [],
    )?;

    Ok(())
}

/// Open (or create) the database at the given path with the schema applied.
pub fn open_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

/// Insert records tagged with their source, skipping exact duplicates.
/// Returns the number of newly inserted rows.
pub fn insert_records(
    conn: &Connection,
    records: &[ResaleRecord],
    source: SourceType,
) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for record in records {
        let hash = record.compute_idempotency_hash();

        let result = conn.execute(
            "INSERT INTO resale_transactions (
                idempotency_hash, month, town, flat_type, block, street_name,
                storey_range, floor_area_sqm, flat_model, lease_commence_date,
                remaining_lease, resale_price, source
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                hash,
                record.month,
                record.town,
                record.flat_type,
                record.block,
                record.street_name,
                record.storey_range,
                record.floor_area_sqm,
                record.flat_model,
                record.lease_commence_date,
                record.remaining_lease,
                record.resale_price,
                source.code(),
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("✓ Inserted: {} records", inserted);
    println!("✓ Skipped duplicates: {}", duplicates);

    Ok(inserted)
}

pub fn get_all_records(conn: &Connection) -> Result<Vec<ResaleRecord>> {
    let mut stmt = conn.prepare(
        "SELECT month, town, flat_type, block, street_name, storey_range,
                floor_area_sqm, flat_model, lease_commence_date,
                remaining_lease, resale_price
         FROM resale_transactions
         ORDER BY month ASC, town ASC",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(ResaleRecord {
                month: row.get(0)?,
                town: row.get(1)?,
                flat_type: row.get(2)?,
                block: row.get(3)?,
                street_name: row.get(4)?,
                storey_range: row.get(5)?,
                floor_area_sqm: row.get(6)?,
                flat_model: row.get(7)?,
                lease_commence_date: row.get(8)?,
                remaining_lease: row.get(9)?,
                resale_price: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM resale_transactions", [], |row| row.get(0))?;

    Ok(count)
}

/// Row count for one source tag
pub fn count_by_source(conn: &Connection, source: SourceType) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM resale_transactions WHERE source = ?1",
        params![source.code()],
        |row| row.get(0),
    )?;

    Ok(count)
}

/// One import/fetch run as recorded in the ingest log
#[derive(Debug, Clone, Serialize)]
pub struct IngestRun {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub record_count: usize,
}

/// Record an import/fetch run so the dashboard can show data freshness.
pub fn log_ingest(conn: &Connection, source: SourceType, record_count: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO ingest_log (source, fetched_at, record_count) VALUES (?1, ?2, ?3)",
        params![source.code(), Utc::now().to_rfc3339(), record_count as i64],
    )?;

    Ok(())
}

/// Most recent ingest run per source, newest first.
pub fn get_ingest_log(conn: &Connection) -> Result<Vec<IngestRun>> {
    let mut stmt = conn.prepare(
        "SELECT source, fetched_at, record_count
         FROM ingest_log
         ORDER BY fetched_at DESC",
    )?;

    let runs = stmt
        .query_map([], |row| {
            let fetched_at_str: String = row.get(1)?;
            let record_count: i64 = row.get(2)?;

            Ok((row.get::<_, String>(0)?, fetched_at_str, record_count))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let runs = runs
        .into_iter()
        .filter_map(|(source, fetched_at_str, record_count)| {
            let fetched_at = DateTime::parse_from_rfc3339(&fetched_at_str)
                .ok()?
                .with_timezone(&Utc);
            Some(IngestRun {
                source,
                fetched_at,
                record_count: record_count as usize,
            })
        })
        .collect();

    Ok(runs)
}

/// Distinct values of one column, sorted - used to populate filter widgets.
/// Column name comes from the wrappers below, never from user input.
fn distinct_values(conn: &Connection, column: &str) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT {} FROM resale_transactions ORDER BY {} ASC",
        column, column
    );
    let mut stmt = conn.prepare(&sql)?;

    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(values)
}

pub fn distinct_towns(conn: &Connection) -> Result<Vec<String>> {
    distinct_values(conn, "town")
}

pub fn distinct_flat_types(conn: &Connection) -> Result<Vec<String>> {
    distinct_values(conn, "flat_type")
}

pub fn distinct_months(conn: &Connection) -> Result<Vec<String>> {
    distinct_values(conn, "month")
}

// ============================================================================
// TESTS
// ============================================================================
