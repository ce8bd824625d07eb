// src/storage/database.rs
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::normalize::RevenueRecord;
use crate::utils::error::StorageError;

/// SQLite table `revenue (Date, Revenue)`, one row per date.
pub struct RevenueStore {
    conn: Connection,
}

impl RevenueStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::info!("Revenue database opened at {}", path.as_ref().display());
        Ok(store)
    }

    /// In-memory store (useful for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS revenue (
                Date TEXT PRIMARY KEY,
                Revenue REAL NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Inserts records, keeping the first row seen for each date (both within
    /// the batch and against rows already stored). Returns the number inserted.
    pub fn insert_records(&mut self, records: &[RevenueRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO revenue (Date, Revenue) VALUES (?1, ?2)
                 ON CONFLICT(Date) DO NOTHING",
            )?;
            for record in records {
                inserted += stmt.execute(params![record.date, record.revenue])?;
            }
        }
        tx.commit()?;

        let skipped = records.len() - inserted;
        if skipped > 0 {
            tracing::debug!("Skipped {} records with an already stored date", skipped);
        }
        tracing::info!("Inserted {} revenue rows", inserted);
        Ok(inserted)
    }

    /// All stored rows, newest first.
    pub fn load_records(&self) -> Result<Vec<RevenueRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT Date, Revenue FROM revenue ORDER BY Date DESC")?;
        let rows = stmt.query_map([], |row| {
            Ok(RevenueRecord {
                date: row.get::<_, NaiveDate>(0)?,
                revenue: row.get(1)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, d: u32, revenue: f64) -> RevenueRecord {
        RevenueRecord { date: NaiveDate::from_ymd_opt(y, m, d).unwrap(), revenue }
    }

    #[test]
    fn test_insert_and_load() {
        let mut store = RevenueStore::in_memory().unwrap();
        let records = vec![record(2022, 9, 30, 21454.0), record(2022, 12, 31, 24318.0)];

        assert_eq!(store.insert_records(&records).unwrap(), 2);
        assert_eq!(
            store.load_records().unwrap(),
            vec![record(2022, 12, 31, 24318.0), record(2022, 9, 30, 21454.0)]
        );
    }

    #[test]
    fn test_duplicate_dates_keep_first() {
        let mut store = RevenueStore::in_memory().unwrap();
        let records = vec![record(2022, 12, 31, 1.0), record(2022, 12, 31, 2.0)];

        assert_eq!(store.insert_records(&records).unwrap(), 1);
        assert_eq!(store.insert_records(&[record(2022, 12, 31, 3.0)]).unwrap(), 0);
        assert_eq!(store.load_records().unwrap(), vec![record(2022, 12, 31, 1.0)]);
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revenue.db");

        {
            let mut store = RevenueStore::open(&path).unwrap();
            store.insert_records(&[record(2021, 3, 31, 10389.0)]).unwrap();
        }

        let store = RevenueStore::open(&path).unwrap();
        assert_eq!(store.load_records().unwrap(), vec![record(2021, 3, 31, 10389.0)]);
    }
}
