// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 500 Internal Server Error

    #[error("Request blocked by {0} even with a browser User-Agent")]
    Blocked(String),

    #[error("Could not read document: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

/// Failure to turn one raw row into a typed record. Recovered by dropping the row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Amount is empty after stripping currency formatting")]
    EmptyAmount,

    #[error("Amount is not a decimal number: '{0}'")]
    InvalidAmount(String),

    #[error("Amount is negative: '{0}'")]
    NegativeAmount(String),

    #[error("Amount is too large to represent: '{0}'")]
    NonFiniteAmount(String),

    #[error("Date does not match any known format: '{0}'")]
    InvalidDate(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetching failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Table found but no valid revenue rows: {0}")]
    NoValidRecords(String),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
