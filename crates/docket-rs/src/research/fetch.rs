//! External page fetch collaborator.
//!
//! Fetching a full page is the expensive half of web research: it is
//! quota-metered and approval-gated at the tool layer. This module
//! only does the HTTP and HTML-to-text work; quota and truncation
//! live with the tool.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// User agent presented to fetched sites.
pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; DocketAnalysisBot/1.0)";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const TEXT_WIDTH: usize = 120;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

/// Fetches one page and returns its readable text. Error strings are
/// complete, user-facing sentences the tool layer passes through
/// unchanged.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> FetchFuture<'_>;
}

/// Reqwest-backed fetcher that strips fetched HTML down to text.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(FETCH_USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> FetchFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            debug!("Fetching {url}");
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| fetch_error(&url, &e))?;
            let status = response.status().as_u16();
            if status != 200 {
                return Err(format!("Error: Failed to fetch URL (status {status}): {url}"));
            }
            let body = response
                .bytes()
                .await
                .map_err(|e| fetch_error(&url, &e))?;
            Ok(readable_text(&body))
        })
    }
}

fn fetch_error(url: &str, e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Error: Request timed out while fetching: {url}")
    } else {
        format!("Error fetching URL: {e}")
    }
}

/// Convert a fetched body to readable text. Falls back to a lossy
/// UTF-8 view when HTML extraction produces nothing.
fn readable_text(body: &[u8]) -> String {
    match html2text::from_read(body, TEXT_WIDTH) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_becomes_readable_text() {
        let html = b"<html><body><h1>Filing Rules</h1><p>Section 12 applies.</p></body></html>";
        let text = readable_text(html);
        assert!(text.contains("Filing Rules"));
        assert!(text.contains("Section 12 applies."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn plain_text_passes_through() {
        let text = readable_text(b"just plain text");
        assert!(text.contains("just plain text"));
    }
}
