// src/pipeline.rs
use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::extractors::{TableExtractor, TableSelector};
use crate::fetch::{DocumentSource, FetchedDocument};
use crate::normalize::{default_date_formats, NormalizeReport, Normalizer};
use crate::utils::AppError;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub selector: Option<TableSelector>,
    pub date_formats: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            selector: None,
            date_formats: default_date_formats(),
        }
    }
}

/// What one document produced.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub source: DocumentSource,
    pub retrieved_at: DateTime<Utc>,
    pub raw_rows: usize,
    pub report: NormalizeReport,
}

/// Extractor followed by normalizer, applied per document.
pub struct Pipeline {
    extractor: TableExtractor,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            extractor: TableExtractor::new(config.selector),
            normalizer: Normalizer::new(config.date_formats),
        }
    }

    /// Fails with `Extraction` when the table is missing and with
    /// `NoValidRecords` when the table is there but nothing in it normalizes.
    pub fn process_document(&self, document: &FetchedDocument) -> Result<DocumentOutcome, AppError> {
        tracing::info!("Processing document: {}", document.source);

        let rows = self.extractor.extract_rows(&document.body)?;
        let report = self.normalizer.normalize_all(&rows);

        if report.records.is_empty() {
            return Err(AppError::NoValidRecords(format!(
                "{} ({} raw rows, {} dropped)",
                document.source,
                rows.len(),
                report.dropped
            )));
        }

        tracing::info!("{}: {} records from {} rows", document.source, report.records.len(), rows.len());
        Ok(DocumentOutcome {
            source: document.source.clone(),
            retrieved_at: document.retrieved_at,
            raw_rows: rows.len(),
            report,
        })
    }

    /// Processes independent documents in parallel; results keep input order.
    pub fn process_documents(&self, documents: &[FetchedDocument]) -> Vec<Result<DocumentOutcome, AppError>> {
        documents
            .par_iter()
            .map(|document| self.process_document(document))
            .collect()
    }
}
