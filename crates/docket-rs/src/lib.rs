//! Quota-bounded analysis harness for document data rooms.
//!
//! `docket-rs` runs structured reviews of pre-extracted document corpora
//! ("data rooms"): a set of PDFs rendered to page images and summarized
//! page by page ahead of time. The core abstraction is the
//! [`ApprovalDriver`](approval::ApprovalDriver) — a reusable suspend/resume
//! loop that starts a [`Workflow`](approval::Workflow), collects a reviewer
//! decision for every guarded tool call it stops on, resumes it with those
//! decisions, and repeats until the workflow completes or an iteration
//! limit is reached.
//!
//! Retrieval is tiered by cost. Listing the corpus is free, page summaries
//! are cheap, and full page images draw down a hard per-session quota that
//! a shared [`QuotaGuard`](retrieval::QuotaGuard) enforces. Tools that
//! spend quota or reach outside the corpus suspend the workflow for human
//! review before they run.
//!
//! # Getting started
//!
//! Add `docket-rs` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docket-rs = { path = "../docket-rs" }
//! ```
//!
//! Then run a reviewed session over a corpus directory:
//!
//! ```ignore
//! use docket_rs::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load the pre-extracted corpus index.
//!     let index = Arc::new(CorpusIndex::open_dir("/path/to/data_room")?);
//!
//!     // Session-scoped retrieval ceilings.
//!     let quota = Arc::new(QuotaGuard::new());
//!     let service = Arc::new(RetrievalService::new(index.clone(), quota.clone()));
//!
//!     // Register the corpus tools; anything past the free listing tier
//!     // is marked review-required at registration.
//!     let tools = Arc::new(ToolSet::new().with_corpus_tools(service));
//!
//!     // Walk the corpus tier by tier under an auto-approving reviewer.
//!     let mut workflow = TriageWorkflow::new(tools, index, TriageConfig::default());
//!     let report = ApprovalDriver::new(AutoApprover).run(&mut workflow).await;
//!
//!     println!("session {}: {:?}", report.session_id, report.status);
//!     println!(
//!         "page quota remaining: {}",
//!         quota.remaining(QuotaResource::PageImages)
//!     );
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! If you're looking for how to...
//!
//! - **Define tools:** see the [`Tool`](tools::core::Tool) trait,
//!   [`ToolSet`](tools::core::ToolSet) for collection/dispatch, and
//!   [`tools::corpus_tools`] / [`tools::research_tools`] for the built-in
//!   data-room tools. Use [`ToolSpec`](tools::spec::ToolSpec) for rich tool
//!   descriptions with `when_to_use` / `when_not_to_use` guidance.
//!
//! - **Run a reviewed session:** see [`ApprovalDriver`](approval::ApprovalDriver)
//!   and the [`Workflow`](approval::Workflow) trait. Reviewers implement
//!   [`Reviewer`](approval::Reviewer) — [`ConsoleReviewer`](approval::ConsoleReviewer)
//!   for interactive terminal review, [`AutoApprover`](approval::AutoApprover)
//!   for unattended runs, [`ScriptedReviewer`](approval::ScriptedReviewer)
//!   for tests.
//!
//! - **Bound retrieval cost:** see [`QuotaGuard`](retrieval::QuotaGuard) for
//!   the reserve/commit ledger and [`RetrievalService`](retrieval::RetrievalService)
//!   for the tiered read path over a loaded corpus.
//!
//! - **Load or build a corpus:** see [`CorpusIndex`](corpus::CorpusIndex)
//!   for the loader, [`CorpusBuilder`](corpus::CorpusBuilder) +
//!   [`write_index`](corpus::write_index) for producing an index, and
//!   [`estimate_image_tokens`](corpus::estimate_image_tokens) for the
//!   vision-token cost model.
//!
//! - **Reach the public web:** implement [`SearchProvider`](research::SearchProvider)
//!   and [`PageFetcher`](research::PageFetcher), or use the bundled
//!   [`HttpPageFetcher`](research::HttpPageFetcher). The corresponding tools
//!   live in [`tools::research_tools`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`approval`] | Suspend/resume driver, pending actions, decisions, review policies, reviewers |
//! | [`corpus`] | Index data model, loader, atomic writer, vision-token estimator |
//! | [`retrieval`] | [`QuotaGuard`](retrieval::QuotaGuard) ledger and the tiered [`RetrievalService`](retrieval::RetrievalService) |
//! | [`research`] | Web search/fetch traits and the HTTP page fetcher |
//! | [`tools`] | [`Tool`](tools::core::Tool) trait, [`ToolSet`](tools::core::ToolSet), the five data-room tools, [`ToolSpec`](tools::spec::ToolSpec) |
//! | [`workflow`] | The deterministic corpus-walk triage workflow |
//!
//! # Design principles
//!
//! 1. **Escalating cost takes escalating ceremony.** Listing is free and
//!    runs inline. Summaries are cheap but reviewed. Page images and web
//!    fetches spend hard quota and always stop for a decision first.
//!
//! 2. **Tools are the unit of capability.** Every corpus or web operation
//!    is a [`Tool`](tools::core::Tool) implementor with a JSON Schema
//!    definition and an async `execute`. Adding a capability means
//!    implementing one trait.
//!
//! 3. **The quota ledger is ground truth.** Every expensive retrieval
//!    reserves before it runs and commits only what succeeded. A refused
//!    request costs the session nothing, and remaining allowance is
//!    reported back in tool output so the caller can plan.
//!
//! 4. **Reviewers gate, they don't stall.** A rejection becomes a recorded
//!    tool result and the session keeps moving. Every run ends in a
//!    [`SessionReport`](approval::SessionReport) whatever the reviewer
//!    decided.

pub mod approval;
pub mod corpus;
pub mod prelude;
pub mod research;
pub mod retrieval;
pub mod tools;
pub mod workflow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Re-export schemars for downstream crates.
pub use schemars;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. This is the bridge between strong Rust argument
/// types and the `serde_json::Value` a [`ToolDef`] carries.
///
/// # Example
///
/// ```
/// use docket_rs::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct PageArgs {
///     document_id: String,
///     #[serde(default)]
///     page_numbers: Vec<u32>,
/// }
///
/// let schema = json_schema_for::<PageArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"document_id".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Tool definition types ──────────────────────────────────────────

/// The type of a tool definition. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Machine-readable tool definition (function-calling format). This is
/// what [`ToolSet::definitions`](tools::core::ToolSet::definitions)
/// hands to whatever is driving the session.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

impl ToolDef {
    /// Create a function-calling tool definition.
    ///
    /// This is the standard constructor — `ToolType` is always `Function`,
    /// so there's no reason to specify it manually.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_marks_defaulted_fields_optional() {
        let schema = json_schema_for::<tools::research_tools::WebSearchArgs>();
        assert_eq!(schema["type"], "object");
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&"query".into()));
        assert!(!required.contains(&"max_results".into()));
    }

    #[test]
    fn tool_def_serializes_function_calling_shape() {
        let def = ToolDef::new(
            "list_documents",
            "List every document in the corpus.",
            serde_json::json!({"type": "object", "properties": {}}),
        );
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "list_documents");
        assert_eq!(json["function"]["parameters"]["type"], "object");
    }
}
