// src/main.rs
mod utils;
mod fetch;
mod extractors;
mod normalize;
mod pipeline;
mod report;
mod storage;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use extractors::TableSelector;
use fetch::{client::PageClient, DocumentSource, FetchedDocument};
use normalize::{default_date_formats, RevenueRecord};
use pipeline::{Pipeline, PipelineConfig};
use report::ChartData;
use storage::{RevenueStore, StorageManager};
use utils::AppError;

/// Command Line Interface for the quarterly revenue scraper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to scrape (repeatable)
    #[arg(short, long)]
    url: Vec<String>,

    /// Saved HTML file to read instead of fetching (repeatable)
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Pick the first table whose text contains this label, e.g. "Quarterly Revenue"
    #[arg(short, long, conflicts_with = "table_index")]
    label: Option<String>,

    /// Pick the table at this zero-based position
    #[arg(long)]
    table_index: Option<usize>,

    /// chrono date format for the date column (repeatable, replaces the defaults)
    #[arg(long = "date-format")]
    date_formats: Vec<String>,

    /// SQLite database receiving the `revenue (Date, Revenue)` rows
    #[arg(long, default_value = "revenue.db")]
    db: PathBuf,

    /// Output directory for JSON records, metadata and chart data
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// File stem for the JSON outputs
    #[arg(short, long, default_value = "revenue")]
    name: String,

    /// Number of bins in the revenue distribution
    #[arg(long, default_value_t = 10)]
    bins: usize,

    /// Only total years strictly before this one (drops an incomplete year)
    #[arg(long)]
    complete_years_before: Option<i32>,

    /// Pause before each HTTP request, in milliseconds
    #[arg(long, default_value_t = 0)]
    request_delay_ms: u64,

    /// Debug mode - save raw and annotated HTML files
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn sources(&self) -> Vec<DocumentSource> {
        self.url
            .iter()
            .cloned()
            .map(DocumentSource::Url)
            .chain(self.input.iter().cloned().map(DocumentSource::File))
            .collect()
    }

    fn pipeline_config(&self) -> PipelineConfig {
        let selector = match (&self.label, self.table_index) {
            (Some(label), _) => Some(TableSelector::ByLabel(label.clone())),
            (None, Some(index)) => Some(TableSelector::ByIndex(index)),
            (None, None) => None,
        };
        let date_formats = if self.date_formats.is_empty() {
            default_date_formats()
        } else {
            self.date_formats.clone()
        };
        PipelineConfig { selector, date_formats }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let sources = args.sources();
    if sources.is_empty() {
        return Err(AppError::Config("Provide at least one --url or --input".to_string()));
    }

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Fetch every document
    let client = PageClient::new(Duration::from_millis(args.request_delay_ms))?;
    let mut documents: Vec<FetchedDocument> = Vec::with_capacity(sources.len());
    let mut failure_count = 0;

    for source in &sources {
        match client.load_document(source).await {
            Ok(document) => {
                tracing::info!("Loaded {} ({} bytes)", source, document.body.len());
                if args.debug {
                    save_debug_copies(&storage, &document, args.label.as_deref());
                }
                documents.push(document);
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", source, e);
                failure_count += 1;
            }
        }
    }

    // 5. Extract and normalize, one document per rayon task
    let pipeline = Pipeline::new(args.pipeline_config());
    let mut outcomes = Vec::new();
    for result in pipeline.process_documents(&documents) {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e @ AppError::NoValidRecords(_)) => {
                tracing::warn!("{}", e);
                failure_count += 1;
            }
            Err(e) => {
                tracing::error!("{}", e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", outcomes.len(), failure_count);

    if outcomes.is_empty() {
        return Err(AppError::Processing(format!(
            "No revenue records extracted from {} documents",
            sources.len()
        )));
    }

    // 6. Persist, deduplicating on date
    let records: Vec<RevenueRecord> = outcomes
        .iter()
        .flat_map(|outcome| outcome.report.records.iter().cloned())
        .collect();

    let mut store = RevenueStore::open(&args.db)?;
    let inserted = store.insert_records(&records)?;
    let stored = store.load_records()?;

    // 7. Write outputs
    storage.save_records(&args.name, &stored)?;
    storage.save_metadata(&args.name, &outcomes, inserted)?;
    let charts = ChartData::build(&stored, args.bins, args.complete_years_before);
    storage.save_charts(&args.name, &charts)?;

    tracing::info!(
        "Stored {} new rows ({} total) in {}",
        inserted,
        stored.len(),
        args.db.display()
    );
    if let Some(latest) = stored.first() {
        tracing::info!("Latest quarter: {} {}", latest.date, normalize::format_usd(latest.revenue));
    }
    Ok(())
}

fn save_debug_copies(storage: &StorageManager, document: &FetchedDocument, label: Option<&str>) {
    if let Err(e) = storage.save_raw_document(document) {
        tracing::warn!("Failed to save raw document: {}", e);
    }

    let annotated = storage
        .debug_path(&format!("{}_annotated.html", document.slug()))
        .map_err(AppError::from)
        .and_then(|path| utils::html_debug::save_annotated_html(&document.body, path, label));
    if let Err(e) = annotated {
        tracing::warn!("Failed to create debug HTML: {}", e);
    }
}
