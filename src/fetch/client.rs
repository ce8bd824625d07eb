// src/fetch/client.rs
use std::time::Duration;

use reqwest::{header, StatusCode};

use crate::fetch::models::{DocumentSource, FetchedDocument};
use crate::utils::error::FetchError;

// Sent only after the first, header-less request has been blocked.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";
const BLOCKED_MARKER: &str = "403 Forbidden";

/// Some sites answer blocked scrapers with a 200 page saying "403 Forbidden".
fn is_blocked(status: StatusCode, body: &str) -> bool {
    status == StatusCode::FORBIDDEN || body.contains(BLOCKED_MARKER)
}

pub struct PageClient {
    client: reqwest::Client,
    request_delay: Duration,
}

impl PageClient {
    pub fn new(request_delay: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, request_delay })
    }

    #[cfg(test)]
    fn with_client(client: reqwest::Client) -> Self {
        Self { client, request_delay: Duration::ZERO }
    }

    /// Reads a document from wherever `source` points.
    pub async fn load_document(&self, source: &DocumentSource) -> Result<FetchedDocument, FetchError> {
        let body = match source {
            DocumentSource::Url(url) => self.download_page(url).await?,
            DocumentSource::File(path) => {
                tracing::info!("Reading document from file: {}", path.display());
                tokio::fs::read_to_string(path).await?
            }
        };
        Ok(FetchedDocument::new(source.clone(), body))
    }

    /// Downloads `url`, retrying once with a browser User-Agent if the first
    /// answer looks blocked.
    pub async fn download_page(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!("Downloading page from: {}", url);

        let (status, body) = self.get(url, None).await?;
        if !is_blocked(status, &body) {
            return Self::check_status(url, status, body);
        }

        tracing::warn!("Request to {} was blocked ({}), retrying with browser User-Agent", url, status);
        let (status, body) = self.get(url, Some(BROWSER_USER_AGENT)).await?;
        if is_blocked(status, &body) {
            tracing::error!("Still blocked after User-Agent retry: {}", url);
            return Err(FetchError::Blocked(url.to_string()));
        }
        Self::check_status(url, status, body)
    }

    async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<(StatusCode, String), FetchError> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*");
        if let Some(agent) = user_agent {
            request = request.header(header::USER_AGENT, agent);
        }

        let response = request.send().await?; // Propagates reqwest::Error as FetchError::Network
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok((status, body))
    }

    fn check_status(url: &str, status: StatusCode, body: String) -> Result<String, FetchError> {
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(FetchError::Http(status));
        }
        Ok(body)
    }
}
