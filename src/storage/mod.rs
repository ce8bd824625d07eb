// src/storage/mod.rs
pub mod database;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::fetch::FetchedDocument;
use crate::normalize::RevenueRecord;
use crate::pipeline::DocumentOutcome;
use crate::report::ChartData;
use crate::utils::error::StorageError;

pub use database::RevenueStore;

/// Writes JSON outputs and debug dumps under one base directory.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the normalized records as `<name>_revenue.json`
    pub fn save_records(&self, name: &str, records: &[RevenueRecord]) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join(format!("{}_revenue.json", name));
        self.write_json(&path, &records)?;
        tracing::info!("Saved {} records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Saves a summary of the run as `<name>_revenue_meta.json`
    pub fn save_metadata(
        &self,
        name: &str,
        outcomes: &[DocumentOutcome],
        inserted: usize,
    ) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join(format!("{}_revenue_meta.json", name));

        let documents: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| {
                serde_json::json!({
                    "source": outcome.source,
                    "retrieved_at": outcome.retrieved_at.to_rfc3339(),
                    "raw_rows": outcome.raw_rows,
                    "records": outcome.report.records.len(),
                    "dropped_rows": outcome.report.dropped,
                })
            })
            .collect();

        let metadata = serde_json::json!({
            "name": name,
            "documents": documents,
            "inserted_rows": inserted,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.write_json(&path, &metadata)?;
        tracing::info!("Saved metadata to {}", path.display());
        Ok(path)
    }

    /// Saves the derived chart series as `<name>_charts.json`
    pub fn save_charts(&self, name: &str, charts: &ChartData) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join(format!("{}_charts.json", name));
        self.write_json(&path, charts)?;
        tracing::info!("Saved chart data to {}", path.display());
        Ok(path)
    }

    /// Saves raw markup under `debug/` and returns the path it was written to.
    pub fn save_raw_document(&self, document: &FetchedDocument) -> Result<PathBuf, StorageError> {
        let path = self.debug_path(&format!("{}.html", document.slug()))?;
        fs::write(&path, &document.body)?;
        tracing::info!("Saved raw document to {}", path.display());
        Ok(path)
    }

    /// Path of a file under `debug/`, creating the directory if needed.
    pub fn debug_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let debug_dir = self.base_dir.join("debug");
        if !debug_dir.exists() {
            fs::create_dir_all(&debug_dir)?;
        }
        Ok(debug_dir.join(filename))
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }
}
