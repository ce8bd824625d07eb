// src/fetch/models.rs
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where a document's markup comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum DocumentSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Url(url) => write!(f, "{}", url),
            DocumentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Raw markup plus where and when it was obtained.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source: DocumentSource,
    pub body: String,
    pub retrieved_at: DateTime<Utc>,
}

impl FetchedDocument {
    pub fn new(source: DocumentSource, body: String) -> Self {
        Self {
            source,
            body,
            retrieved_at: Utc::now(),
        }
    }

    /// File-system friendly name derived from the source, used for debug dumps.
    pub fn slug(&self) -> String {
        let raw = match &self.source {
            DocumentSource::Url(url) => url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string(),
            DocumentSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let slug: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let slug = slug.trim_matches('_');
        if slug.is_empty() { "document".to_string() } else { slug.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_url() {
        let doc = FetchedDocument::new(
            DocumentSource::Url("https://www.macrotrends.net/stocks/charts/TSLA/tesla/revenue".into()),
            String::new(),
        );
        assert_eq!(doc.slug(), "www_macrotrends_net_stocks_charts_TSLA_tesla_revenue");
    }

    #[test]
    fn test_slug_from_file() {
        let doc = FetchedDocument::new(DocumentSource::File(PathBuf::from("/tmp/tsla page.html")), String::new());
        assert_eq!(doc.slug(), "tsla_page");
    }
}
