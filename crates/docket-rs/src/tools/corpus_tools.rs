//! The three corpus access tools.
//!
//! Access is tiered by cost: `list_documents` is free, `get_documents`
//! returns page-by-page summaries, and `get_document_pages` serves full page
//! images against the session quota. The two deeper tiers are review-required;
//! the listing is not. Result formatting keeps the session transcript
//! conventions (60-char rules, one block per item, a quota footer on guarded
//! retrievals).

use crate::ToolDef;
use crate::retrieval::{PageOutcome, RetrievalError, RetrievalService};
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

// ── list_documents ─────────────────────────────────────────────────

/// Lists every document in the corpus with its overview fields.
///
/// The entry tier: unguarded, no quota, intended as the first call of
/// any session.
pub struct ListDocumentsTool {
    service: Arc<RetrievalService>,
}

impl ListDocumentsTool {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

impl Tool for ListDocumentsTool {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder("list_documents")
            .purpose("List all documents in the data room with their IDs and summary descriptions")
            .when_to_use(
                "First, when beginning analysis, to understand what documents are available",
            )
            .when_not_to_use(
                "When you already know which documents matter; go straight to get_documents",
            )
            .parameters(serde_json::json!({"type": "object", "properties": {}}))
            .example(
                "list_documents()",
                "Returns one overview block per document",
            )
            .output_format("One block per document: ID, title, type, page count, summary")
            .to_tool_def()
    }

    fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
        let service = self.service.clone();
        Box::pin(async move {
            let documents = service.index().list_documents();
            if documents.is_empty() {
                return "No documents found in data room.".to_string();
            }

            let mut lines = vec![
                "Available Documents in Data Room:".to_string(),
                "=".repeat(60),
                String::new(),
            ];
            for doc in &documents {
                lines.push(format!("Document ID: {}", doc.id));
                lines.push(format!("Title: {}", doc.title));
                lines.push(format!("Type: {}", doc.document_type));
                lines.push(format!("Pages: {}", doc.page_count));
                lines.push(format!("Summary: {}", doc.summary_description));
                lines.push(String::new());
            }
            lines.join("\n")
        })
    }
}

// ── get_documents ──────────────────────────────────────────────────

/// Arguments for `get_documents`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDocumentsArgs {
    /// Document IDs to retrieve (e.g. `["doc_001", "doc_005"]`).
    pub document_ids: Vec<String>,
}

/// Returns page-by-page summaries for the requested documents.
///
/// The middle tier: review-required but quota-free. Unknown IDs are
/// dropped silently unless nothing at all resolves.
pub struct GetDocumentsTool {
    service: Arc<RetrievalService>,
}

impl GetDocumentsTool {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

impl Tool for GetDocumentsTool {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder("get_documents")
            .purpose("Retrieve page-by-page summaries for specified documents")
            .when_to_use(
                "After reviewing the document listing, when a document looks relevant \
                 and you need page-level detail",
            )
            .when_not_to_use(
                "When a page needs visual inspection; summaries describe content but \
                 do not show it",
            )
            .parameters_for::<GetDocumentsArgs>()
            .example(
                r#"get_documents(document_ids=["doc_001", "doc_005"])"#,
                "Returns page-by-page summaries for both documents",
            )
            .output_format("Per document: title, type, summary, then one summary line per page")
            .disambiguate(
                "A specific page needs detailed visual examination",
                "get_document_pages",
                "page summaries only describe what a page contains",
            )
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let service = self.service.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: GetDocumentsArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.document_ids.is_empty() {
                return "Error: Please provide at least one document ID".to_string();
            }

            let result = service.index().page_summaries(&args.document_ids);
            if result.is_empty() {
                return format!(
                    "Error: None of the requested documents were found: {:?}",
                    args.document_ids
                );
            }

            let mut lines = vec![
                "Retrieved Document Details:".to_string(),
                "=".repeat(60),
                String::new(),
            ];
            for (doc_id, doc) in &result {
                lines.push(format!("Document: {} ({doc_id})", doc.title));
                lines.push(format!("Type: {}", doc.document_type));
                lines.push(format!("Summary: {}", doc.summary));
                lines.push(String::new());
                lines.push("Page-by-Page Summaries:".to_string());
                lines.push("-".repeat(40));
                for page in &doc.pages {
                    lines.push(format!("  Page {}:", page.page_number));
                    lines.push(format!("    {}", page.summary));
                    lines.push(String::new());
                }
                lines.push("=".repeat(60));
                lines.push(String::new());
            }
            lines.join("\n")
        })
    }

    fn requires_review(&self) -> bool {
        true
    }
}

// ── get_document_pages ─────────────────────────────────────────────

/// Arguments for `get_document_pages`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDocumentPagesArgs {
    /// The document ID (e.g. `"doc_001"`).
    pub document_id: String,
    /// Specific page numbers to retrieve (e.g. `[1, 5, 12]`).
    pub page_numbers: Vec<u32>,
}

/// Serves full page images against the session's page quota.
///
/// The deepest tier: review-required and quota-charged. Whole-request
/// failures (quota refusal, unknown document) cost nothing; within an
/// accepted request, only pages that produce image data are charged.
pub struct GetDocumentPagesTool {
    service: Arc<RetrievalService>,
}

impl GetDocumentPagesTool {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

impl Tool for GetDocumentPagesTool {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder("get_document_pages")
            .purpose("Retrieve full page images for detailed examination")
            .when_to_use(
                "After reviewing page summaries, for the specific pages that need \
                 close reading",
            )
            .when_not_to_use(
                "For broad reconnaissance; the session allows 50 page retrievals \
                 total, so spend them on pages that matter",
            )
            .parameters_for::<GetDocumentPagesArgs>()
            .example(
                r#"get_document_pages(document_id="doc_001", page_numbers=[1, 5, 12])"#,
                "Returns three page images with their summaries",
            )
            .output_format(
                "Header with retrieved count and remaining quota, then one block per page",
            )
            .disambiguate(
                "You only need to know what a page covers",
                "get_documents",
                "summaries answer that without drawing down the quota",
            )
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let service = self.service.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: GetDocumentPagesArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            if args.page_numbers.is_empty() {
                return "Error: Please specify at least one page number".to_string();
            }

            let fetch = match service.page_images(&args.document_id, &args.page_numbers) {
                Ok(f) => f,
                Err(e) => return retrieval_error_text(&e),
            };

            let mut lines = vec![
                format!(
                    "Retrieved {} pages from {} ({})",
                    fetch.retrieved, fetch.title, fetch.document_id
                ),
                format!("Remaining page retrieval quota: {}", fetch.remaining),
                "=".repeat(60),
                String::new(),
            ];
            for page in &fetch.pages {
                match page {
                    PageOutcome::Image {
                        page_number,
                        summary,
                        ..
                    } => {
                        lines.push(format!("Page {page_number}:"));
                        lines.push(format!("Summary: {summary}"));
                        lines.push(
                            "Image: [Base64 image data available for vision analysis]".to_string(),
                        );
                        lines.push(String::new());
                    }
                    PageOutcome::Error {
                        page_number,
                        reason,
                    } => {
                        lines.push(format!("Page {page_number}: ERROR - {reason}"));
                        lines.push(String::new());
                    }
                }
            }
            lines.join("\n")
        })
    }

    fn requires_review(&self) -> bool {
        true
    }
}

/// Map a whole-request failure to the transcript error text.
fn retrieval_error_text(err: &RetrievalError) -> String {
    match err {
        RetrievalError::QuotaAtLimit { limit } => format!(
            "Error: Page retrieval limit reached ({limit} pages). \
             You have already retrieved the maximum number of pages allowed. \
             Consider which previously retrieved pages contain the information you need."
        ),
        RetrievalError::QuotaWouldExceed {
            requested,
            remaining,
        } => format!(
            "Error: Requesting {requested} pages would exceed the limit. \
             You have {remaining} page retrievals remaining. \
             Please reduce the number of pages requested."
        ),
        RetrievalError::NotFound { document_id } => {
            format!("Error: Document {document_id} not found")
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
