// src/fetch/mod.rs
pub mod client;
pub mod models;

pub use models::{DocumentSource, FetchedDocument};
