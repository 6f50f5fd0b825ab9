//! Run a reviewed triage session over a document corpus and print the
//! transcript.
//!
//! Loads the corpus index from the given directory, registers the corpus
//! and web research tools, then walks the corpus tier by tier, stopping
//! for a console decision before every guarded retrieval. Logging goes to
//! stderr; set `RUST_LOG` to adjust verbosity.
//!
//! # Examples
//!
//! ```sh
//! # Interactive review over a data room
//! docket --corpus /path/to/data_room
//!
//! # Unattended: approve everything, pull pages 1 and 2 of each document
//! docket --corpus ./data_room --auto --page 1 --page 2
//!
//! # Add web research to the walk
//! docket --corpus ./data_room --auto \
//!   --search "Delaware corporate governance requirements" \
//!   --fetch https://example.gov/statute
//!
//! # Machine-readable session report
//! docket --corpus ./data_room --auto --json
//! ```

use clap::Parser;
use docket_rs::approval::{
    ApprovalDriver, AutoApprover, ConsoleReviewer, MAX_ITERATIONS, SessionReport, SessionStatus,
};
use docket_rs::corpus::CorpusIndex;
use docket_rs::research::{HttpPageFetcher, HttpSearchProvider};
use docket_rs::retrieval::{QuotaGuard, QuotaResource, RetrievalService};
use docket_rs::tools::{DEFAULT_TOOL_TIMEOUT, DisabledTool, ToolSet, WebFetchTool, WebSearchTool};
use docket_rs::workflow::{TriageConfig, TriageWorkflow};
use std::process;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run a reviewed triage session over a document corpus.
#[derive(Parser)]
#[command(name = "docket")]
struct Cli {
    // ── Corpus ─────────────────────────────────────────────────
    /// Corpus directory containing corpus_index.json
    #[arg(long, default_value = ".")]
    corpus: String,

    // ── Review ─────────────────────────────────────────────────
    /// Approve every guarded action instead of prompting
    #[arg(long)]
    auto: bool,

    /// Maximum suspend/resume cycles before the session aborts
    #[arg(long, default_value_t = MAX_ITERATIONS)]
    max_iterations: u32,

    // ── Walk shape ─────────────────────────────────────────────
    /// Page number pulled from every document during the image pass
    /// (repeatable; defaults to page 1)
    #[arg(long)]
    page: Vec<u32>,

    /// Skip the page-image pass entirely
    #[arg(long)]
    no_images: bool,

    /// Web search query to run during the research pass (repeatable)
    #[arg(long)]
    search: Vec<String>,

    /// URL to fetch during the research pass (repeatable)
    #[arg(long)]
    fetch: Vec<String>,

    // ── Quotas ─────────────────────────────────────────────────
    /// Override the page-image quota for this session
    #[arg(long)]
    page_limit: Option<u32>,

    /// Override the web-fetch quota for this session
    #[arg(long)]
    fetch_limit: Option<u32>,

    // ── Output ─────────────────────────────────────────────────
    /// Print the session report as JSON instead of the transcript
    #[arg(long)]
    json: bool,
}

// ── Session assembly ───────────────────────────────────────────────

fn build_quota(cli: &Cli) -> Arc<QuotaGuard> {
    let mut quota = QuotaGuard::new();
    if let Some(limit) = cli.page_limit {
        quota = quota.with_limit(QuotaResource::PageImages, limit);
    }
    if let Some(limit) = cli.fetch_limit {
        quota = quota.with_limit(QuotaResource::WebFetch, limit);
    }
    Arc::new(quota)
}

/// Register the corpus and research tools.
///
/// Without a `SEARCH_API_KEY` the search tool stays visible but disabled,
/// so a session that tries to use it gets a clear error instead of a 401
/// from the provider.
fn build_tool_set(service: Arc<RetrievalService>, quota: Arc<QuotaGuard>) -> ToolSet {
    let provider = Arc::new(HttpSearchProvider::from_env());
    let fetcher = Arc::new(HttpPageFetcher::new());
    let has_search_key = std::env::var("SEARCH_API_KEY").is_ok();

    ToolSet::new()
        .with_arg_validation(true)
        .with_default_timeout(Some(DEFAULT_TOOL_TIMEOUT))
        .with_corpus_tools(service)
        .with_if(has_search_key, WebSearchTool::new(provider.clone()))
        .with_if(
            !has_search_key,
            DisabledTool::from_tool(
                &WebSearchTool::new(provider),
                "Web search is unavailable. Set SEARCH_API_KEY to enable it.",
            ),
        )
        .with(WebFetchTool::new(fetcher, quota))
}

fn triage_config(cli: &Cli) -> TriageConfig {
    let pages_per_document = if cli.no_images {
        Vec::new()
    } else if cli.page.is_empty() {
        vec![1]
    } else {
        cli.page.clone()
    };
    TriageConfig {
        pages_per_document,
        search_queries: cli.search.clone(),
        fetch_urls: cli.fetch.clone(),
    }
}

// ── Reporting ──────────────────────────────────────────────────────

fn report_json(report: &SessionReport, quota: &QuotaGuard) -> Result<String, String> {
    let summary = serde_json::json!({
        "session_id": report.session_id,
        "status": report.status,
        "iterations": report.iterations,
        "finished_at": report.finished_at,
        "page_quota_remaining": quota.remaining(QuotaResource::PageImages),
        "fetch_quota_remaining": quota.remaining(QuotaResource::WebFetch),
        "final_output": report.final_output,
    });
    serde_json::to_string_pretty(&summary).map_err(|e| format!("failed to format report: {e}"))
}

fn print_summary(report: &SessionReport, quota: &QuotaGuard) {
    eprintln!();
    eprintln!("Session: {}", report.session_id);
    eprintln!("Status: {:?}", report.status);
    eprintln!("Iterations: {}", report.iterations);
    eprintln!(
        "Page quota remaining: {} of {}",
        quota.remaining(QuotaResource::PageImages),
        quota.limit(QuotaResource::PageImages),
    );
    eprintln!(
        "Fetch quota remaining: {} of {}",
        quota.remaining(QuotaResource::WebFetch),
        quota.limit(QuotaResource::WebFetch),
    );
}

// ── Entry ──────────────────────────────────────────────────────────

async fn run_session(cli: &Cli) -> Result<String, String> {
    let index = Arc::new(CorpusIndex::open_dir(&cli.corpus).map_err(|e| e.to_string())?);
    let quota = build_quota(cli);
    let service = Arc::new(RetrievalService::new(index.clone(), quota.clone()));
    let tools = Arc::new(build_tool_set(service, quota.clone()));

    let mut workflow = TriageWorkflow::new(tools, index, triage_config(cli));

    let report = if cli.auto {
        ApprovalDriver::new(AutoApprover)
            .with_max_iterations(cli.max_iterations)
            .run(&mut workflow)
            .await
    } else {
        ApprovalDriver::new(ConsoleReviewer)
            .with_max_iterations(cli.max_iterations)
            .run(&mut workflow)
            .await
    };

    if cli.json {
        return report_json(&report, &quota);
    }

    print_summary(&report, &quota);
    match report.status {
        SessionStatus::Completed => Ok(report.final_output.unwrap_or_default()),
        _ => Err(format!(
            "session {} aborted after {} iteration(s)",
            report.session_id, report.iterations
        )),
    }
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run_session(&cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
