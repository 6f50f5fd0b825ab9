//! The two web research tools.
//!
//! `web_search` is unguarded and unlimited; `web_fetch` is review-required
//! and draws down the session's fetch quota. Both delegate the network work
//! to the [`crate::research`] collaborators, whose error strings are already
//! complete user-facing sentences and pass through unchanged.

use crate::ToolDef;
use crate::research::{PageFetcher, SearchProvider};
use crate::retrieval::{QuotaError, QuotaGuard, QuotaResource};
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Maximum characters of page text returned per fetch.
pub const MAX_FETCH_CHARS: usize = 8000;

// ── web_search ─────────────────────────────────────────────────────

fn default_max_results() -> u32 {
    5
}

/// Arguments for `web_search`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchArgs {
    /// Search query (e.g. `"Delaware corporate governance requirements"`).
    pub query: String,
    /// Maximum number of results to return.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

/// Searches the web through the configured provider.
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder("web_search")
            .purpose(
                "Search the web for statutes, regulations, case law, or other external context",
            )
            .when_to_use(
                "When interpreting a provision requires external authority the corpus \
                 does not contain",
            )
            .when_not_to_use(
                "When the answer is in the documents themselves, or when you already \
                 have the URL; fetch it instead",
            )
            .parameters_for::<WebSearchArgs>()
            .example(
                r#"web_search(query="Delaware corporate governance requirements")"#,
                "Returns up to 5 results with titles, URLs, and snippets",
            )
            .output_format("Numbered results with URL, snippet, and source domain")
            .disambiguate(
                "You already have the exact URL",
                "web_fetch",
                "search adds nothing when the source is known",
            )
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let provider = self.provider.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: WebSearchArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.query.trim().is_empty() {
                return "Error: Please provide a search query".to_string();
            }

            let hits = match provider.search(&args.query, args.max_results).await {
                Ok(h) => h,
                Err(e) => return e,
            };
            if hits.is_empty() {
                return format!("No results found for query: {}", args.query);
            }

            let mut lines = vec![
                format!("Search Results for: {}", args.query),
                "=".repeat(60),
                String::new(),
            ];
            for (idx, hit) in hits.iter().enumerate() {
                lines.push(format!(
                    "{}. {}",
                    idx + 1,
                    hit.title.as_deref().unwrap_or("Untitled")
                ));
                lines.push(format!("   URL: {}", hit.url.as_deref().unwrap_or("N/A")));
                lines.push(format!(
                    "   Snippet: {}",
                    hit.snippet.as_deref().unwrap_or("No snippet available")
                ));
                lines.push(format!(
                    "   Source: {}",
                    hit.domain.as_deref().unwrap_or("Unknown")
                ));
                lines.push(String::new());
            }
            lines.push(
                "Use web_fetch with specific URLs to retrieve full content from authoritative \
                 sources."
                    .to_string(),
            );
            lines.join("\n")
        })
    }
}

// ── web_fetch ──────────────────────────────────────────────────────

/// Arguments for `web_fetch`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebFetchArgs {
    /// The complete URL to fetch (e.g. `"https://www.sec.gov/rules/..."`).
    pub url: String,
}

/// Fetches one web page against the session's fetch quota.
///
/// A failed fetch costs nothing; the quota is charged only after the
/// page body arrives.
pub struct WebFetchTool {
    fetcher: Arc<dyn PageFetcher>,
    quota: Arc<QuotaGuard>,
}

impl WebFetchTool {
    pub fn new(fetcher: Arc<dyn PageFetcher>, quota: Arc<QuotaGuard>) -> Self {
        Self { fetcher, quota }
    }
}

impl Tool for WebFetchTool {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder("web_fetch")
            .purpose("Fetch the complete content of a specific web page")
            .when_to_use(
                "After web_search has surfaced an authoritative source worth reading \
                 in full",
            )
            .when_not_to_use(
                "For exploratory browsing; the session allows 20 fetches total and \
                 each one needs approval",
            )
            .parameters_for::<WebFetchArgs>()
            .example(
                r#"web_fetch(url="https://www.sec.gov/rules/final/2024/33-11275.pdf")"#,
                "Returns the page text with HTML stripped",
            )
            .output_format("Header with the URL and remaining quota, then the page text")
            .disambiguate(
                "You only have a topic, not a URL",
                "web_search",
                "search first, then fetch the best result",
            )
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let fetcher = self.fetcher.clone();
        let quota = self.quota.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: WebFetchArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.url.trim().is_empty() {
                return "Error: Please provide a URL to fetch".to_string();
            }

            if let Err(e) = quota.try_reserve(QuotaResource::WebFetch, 1) {
                return fetch_quota_text(&e);
            }

            let text = match fetcher.fetch(&args.url).await {
                Ok(t) => t,
                Err(e) => return e,
            };
            let text = clip_chars(text, MAX_FETCH_CHARS);
            let remaining = quota.commit(QuotaResource::WebFetch, 1);

            [
                format!("Fetched content from: {}", args.url),
                format!("Remaining fetch quota: {remaining}"),
                "=".repeat(60),
                String::new(),
                text,
            ]
            .join("\n")
        })
    }

    fn requires_review(&self) -> bool {
        true
    }
}

/// Map a quota refusal to the transcript error text.
fn fetch_quota_text(err: &QuotaError) -> String {
    match err {
        QuotaError::AtLimit { limit } => format!(
            "Error: Web fetch limit reached ({limit} fetches). \
             You have already retrieved the maximum number of web pages allowed. \
             Review the content you have already fetched."
        ),
        // A single-unit reserve can only fail at the limit; the arm exists
        // for the enum.
        QuotaError::WouldExceed {
            requested,
            remaining,
        } => format!(
            "Error: Requesting {requested} fetches would exceed the limit. \
             You have {remaining} fetches remaining."
        ),
    }
}

/// Clip fetched text to at most `max` characters, appending a notice.
fn clip_chars(text: String, max: usize) -> String {
    if text.chars().count() <= max {
        return text;
    }
    let clipped: String = text.chars().take(max).collect();
    format!("{clipped}\n\n[Content truncated at {max} characters]")
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::{FetchFuture, SearchFuture, SearchHit};
    use crate::retrieval::WEB_FETCH_LIMIT;
    use crate::tools::core::ToolSet;

    struct StubSearch {
        hits: Vec<SearchHit>,
    }

    impl SearchProvider for StubSearch {
        fn search(&self, _query: &str, _max_results: u32) -> SearchFuture<'_> {
            let hits = self.hits.clone();
            Box::pin(async move { Ok(hits) })
        }
    }

    struct FailingSearch;

    impl SearchProvider for FailingSearch {
        fn search(&self, _query: &str, _max_results: u32) -> SearchFuture<'_> {
            Box::pin(async { Err("Error: Search request timed out. Please try again.".into()) })
        }
    }

    struct StubFetcher {
        body: String,
    }

    impl PageFetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> FetchFuture<'_> {
            let body = self.body.clone();
            Box::pin(async move { Ok(body) })
        }
    }

    struct FailingFetcher;

    impl PageFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> FetchFuture<'_> {
            let msg = format!("Error: Failed to fetch URL (status 404): {url}");
            Box::pin(async move { Err(msg) })
        }
    }

    fn hit(title: &str, url: &str) -> SearchHit {
        SearchHit {
            title: Some(title.into()),
            url: Some(url.into()),
            snippet: Some(format!("Snippet for {title}")),
            domain: Some("example.com".into()),
        }
    }

    #[tokio::test]
    async fn web_search_requires_query() {
        let tool = WebSearchTool::new(Arc::new(StubSearch { hits: vec![] }));
        let result = tool.execute(r#"{"query": "   "}"#).await;
        assert_eq!(result, "Error: Please provide a search query");
    }

    #[tokio::test]
    async fn web_search_formats_results() {
        let tool = WebSearchTool::new(Arc::new(StubSearch {
            hits: vec![
                hit("Corp Code", "https://example.com/a"),
                hit("Case Law", "https://example.com/b"),
            ],
        }));

        let result = tool.execute(r#"{"query": "delaware"}"#).await;
        assert!(result.starts_with("Search Results for: delaware"));
        assert!(result.contains("1. Corp Code"));
        assert!(result.contains("   URL: https://example.com/b"));
        assert!(result.contains("   Source: example.com"));
        assert!(result.ends_with(
            "Use web_fetch with specific URLs to retrieve full content from authoritative sources."
        ));
    }

    #[tokio::test]
    async fn web_search_reports_empty_results() {
        let tool = WebSearchTool::new(Arc::new(StubSearch { hits: vec![] }));
        let result = tool.execute(r#"{"query": "nothing"}"#).await;
        assert_eq!(result, "No results found for query: nothing");
    }

    #[tokio::test]
    async fn web_search_passes_provider_error_through() {
        let tool = WebSearchTool::new(Arc::new(FailingSearch));
        let result = tool.execute(r#"{"query": "anything"}"#).await;
        assert_eq!(result, "Error: Search request timed out. Please try again.");
    }

    #[tokio::test]
    async fn web_search_fills_missing_fields() {
        let tool = WebSearchTool::new(Arc::new(StubSearch {
            hits: vec![SearchHit {
                title: None,
                url: None,
                snippet: None,
                domain: None,
            }],
        }));

        let result = tool.execute(r#"{"query": "sparse"}"#).await;
        assert!(result.contains("1. Untitled"));
        assert!(result.contains("   URL: N/A"));
        assert!(result.contains("   Snippet: No snippet available"));
        assert!(result.contains("   Source: Unknown"));
    }

    #[tokio::test]
    async fn web_fetch_requires_url() {
        let tool = WebFetchTool::new(
            Arc::new(StubFetcher {
                body: String::new(),
            }),
            Arc::new(QuotaGuard::new()),
        );
        let result = tool.execute(r#"{"url": ""}"#).await;
        assert_eq!(result, "Error: Please provide a URL to fetch");
    }

    #[tokio::test]
    async fn web_fetch_charges_quota_and_formats() {
        let quota = Arc::new(QuotaGuard::new());
        let tool = WebFetchTool::new(
            Arc::new(StubFetcher {
                body: "Body text.".into(),
            }),
            quota.clone(),
        );

        let result = tool.execute(r#"{"url": "https://example.com"}"#).await;
        assert!(result.starts_with("Fetched content from: https://example.com"));
        assert!(result.contains("Remaining fetch quota: 19"));
        assert!(result.ends_with("Body text."));
        assert_eq!(quota.consumed(QuotaResource::WebFetch), 1);
    }

    #[tokio::test]
    async fn web_fetch_failed_fetch_is_not_charged() {
        let quota = Arc::new(QuotaGuard::new());
        let tool = WebFetchTool::new(Arc::new(FailingFetcher), quota.clone());

        let result = tool.execute(r#"{"url": "https://example.com/404"}"#).await;
        assert_eq!(
            result,
            "Error: Failed to fetch URL (status 404): https://example.com/404"
        );
        assert_eq!(quota.consumed(QuotaResource::WebFetch), 0);
    }

    #[tokio::test]
    async fn web_fetch_at_limit() {
        let quota = Arc::new(QuotaGuard::new());
        quota.commit(QuotaResource::WebFetch, WEB_FETCH_LIMIT);
        let tool = WebFetchTool::new(
            Arc::new(StubFetcher {
                body: "unreached".into(),
            }),
            quota,
        );

        let result = tool.execute(r#"{"url": "https://example.com"}"#).await;
        assert!(result.starts_with("Error: Web fetch limit reached (20 fetches)."));
    }

    #[tokio::test]
    async fn web_fetch_clips_long_content() {
        let quota = Arc::new(QuotaGuard::new());
        let tool = WebFetchTool::new(
            Arc::new(StubFetcher {
                body: "x".repeat(MAX_FETCH_CHARS + 1000),
            }),
            quota.clone(),
        );

        let result = tool.execute(r#"{"url": "https://example.com/long"}"#).await;
        assert!(result.contains("[Content truncated at 8000 characters]"));
        assert_eq!(quota.consumed(QuotaResource::WebFetch), 1);
    }

    #[test]
    fn with_research_tools_registers_and_guards() {
        let quota = Arc::new(QuotaGuard::new());
        let set = ToolSet::new().with_research_tools(
            Arc::new(StubSearch { hits: vec![] }),
            Arc::new(StubFetcher {
                body: String::new(),
            }),
            quota,
        );

        assert_eq!(set.len(), 2);
        assert!(!set.is_review_required("web_search"));
        assert!(set.is_review_required("web_fetch"));
    }
}
