//! External web search collaborator.
//!
//! Search is the cheap half of web research: unlimited, no approval,
//! returns titles and snippets only. The provider sits behind a
//! narrow trait so the tool layer and tests never depend on a live
//! API.

use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Default search endpoint, Tavily-compatible.
pub const DEFAULT_SEARCH_API_URL: &str = "https://api.tavily.com/search";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One search result. Every field is optional on the wire; display
/// code substitutes placeholders for whatever is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<SearchHit>, String>> + Send + 'a>>;

/// Runs web searches. Error strings are complete, user-facing
/// sentences the tool layer passes through unchanged.
pub trait SearchProvider: Send + Sync {
    fn search(&self, query: &str, max_results: u32) -> SearchFuture<'_>;
}

/// Reqwest-backed provider for a Tavily-style JSON search API.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpSearchProvider {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_url: api_url.into(),
            api_key,
        }
    }

    /// Default endpoint, key from the `SEARCH_API_KEY` environment
    /// variable if set.
    pub fn from_env() -> Self {
        Self::new(
            DEFAULT_SEARCH_API_URL,
            std::env::var("SEARCH_API_KEY").ok(),
        )
    }
}

impl SearchProvider for HttpSearchProvider {
    fn search(&self, query: &str, max_results: u32) -> SearchFuture<'_> {
        let query = query.to_string();
        Box::pin(async move {
            debug!("Searching the web for '{query}'");
            let mut request = self.client.post(&self.api_url).json(&serde_json::json!({
                "query": query,
                "max_results": max_results,
                "search_depth": "advanced",
            }));
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    "Error: Search request timed out. Please try again.".to_string()
                } else {
                    format!("Error performing web search: {e}")
                }
            })?;
            let status = response.status().as_u16();
            if status != 200 {
                return Err(format!("Error: Search request failed with status {status}"));
            }

            let parsed: SearchResponse = response
                .json()
                .await
                .map_err(|e| format!("Error performing web search: {e}"))?;
            Ok(parsed.results)
        })
    }
}
