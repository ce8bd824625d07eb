// src/normalize/mod.rs
pub mod amount;
pub mod date;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extractors::RawRow;
use crate::utils::error::ParseError;

pub use amount::{convert_magnitude, format_usd};
pub use date::{default_date_formats, parse_date};

/// One typed revenue figure. `revenue` is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Result of normalizing a batch of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub records: Vec<RevenueRecord>,
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    date_formats: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(default_date_formats())
    }
}

impl Normalizer {
    pub fn new(date_formats: Vec<String>) -> Self {
        Self { date_formats }
    }

    pub fn normalize_row(&self, row: &RawRow) -> Result<RevenueRecord, ParseError> {
        let revenue = convert_magnitude(&row.revenue_text)?;
        let date = parse_date(&row.date_text, &self.date_formats)?;
        Ok(RevenueRecord { date, revenue })
    }

    /// Normalizes every row, keeping input order and dropping the rows that fail.
    pub fn normalize_all(&self, rows: &[RawRow]) -> NormalizeReport {
        let mut report = NormalizeReport {
            records: Vec::with_capacity(rows.len()),
            dropped: 0,
        };

        for row in rows {
            match self.normalize_row(row) {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    tracing::debug!("Dropping row ({:?}, {:?}): {}", row.date_text, row.revenue_text, e);
                    report.dropped += 1;
                }
            }
        }

        if report.dropped > 0 {
            tracing::info!("Normalized {} rows, dropped {} malformed", report.records.len(), report.dropped);
        }
        report
    }
}
