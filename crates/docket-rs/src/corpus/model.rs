//! Serialized records that make up a corpus index.
//!
//! The index file is a single JSON document:
//!
//! ```json
//! {
//!   "metadata": { "total_documents": 3, "total_pages": 15, "total_tokens": 42000 },
//!   "documents": [
//!     {
//!       "document_id": "doc_001",
//!       "title": "Master Services Agreement",
//!       "document_type": "contract",
//!       "summary_description": "...",
//!       "page_count": 5,
//!       "pages": [
//!         { "page_number": 1, "summary_description": "...", "image_path": "page_images/doc_001/page_001.png", "tokens_used": 2424 }
//!       ],
//!       "pdf_path": "pdfs/doc_001.pdf",
//!       "total_tokens": 12120
//!     }
//!   ]
//! }
//! ```
//!
//! `image_path` and `pdf_path` are stored relative to the corpus base
//! directory so an index survives the directory being moved or mounted
//! somewhere else.

use serde::{Deserialize, Serialize};

/// One rendered page of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-based page number within the document.
    pub page_number: u32,
    /// Short description of what the page contains.
    pub summary_description: String,
    /// Path to the rendered page image, relative to the corpus base directory.
    pub image_path: String,
    /// Estimated vision-token cost of sending this page to a model.
    pub tokens_used: u64,
}

/// One document in the corpus, with per-page detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable identifier, `doc_001` style.
    pub document_id: String,
    pub title: String,
    /// Free-form category, e.g. `contract` or `financial_statement`.
    pub document_type: String,
    /// Document-level summary.
    pub summary_description: String,
    pub page_count: u32,
    pub pages: Vec<PageRecord>,
    /// Path to the source PDF, relative to the corpus base directory.
    pub pdf_path: String,
    /// Sum of `tokens_used` across pages.
    pub total_tokens: u64,
}

/// Corpus-wide totals, derived from the document list when the index is
/// assembled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub total_documents: u32,
    pub total_pages: u32,
    pub total_tokens: u64,
}

/// Top-level shape of the index file on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusFile {
    pub metadata: CorpusMetadata,
    pub documents: Vec<DocumentRecord>,
}

/// Listing row for the cheapest retrieval tier. Carries everything an
/// agent needs to decide whether a document is worth drilling into,
/// and nothing that costs real tokens to produce.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOverview {
    pub id: String,
    pub title: String,
    pub summary_description: String,
    pub document_type: String,
    pub page_count: u32,
}

impl From<&DocumentRecord> for DocumentOverview {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.document_id.clone(),
            title: doc.title.clone(),
            summary_description: doc.summary_description.clone(),
            document_type: doc.document_type.clone(),
            page_count: doc.page_count,
        }
    }
}

/// Per-page summary line in the mid-tier view.
#[derive(Debug, Clone, Serialize)]
pub struct PageBrief {
    pub page_number: u32,
    pub summary: String,
}

/// Mid-tier view of one document: document metadata plus a summary line
/// per page, still no page images.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPageSummaries {
    pub title: String,
    pub document_type: String,
    pub summary: String,
    pub pages: Vec<PageBrief>,
}

impl From<&DocumentRecord> for DocumentPageSummaries {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            title: doc.title.clone(),
            document_type: doc.document_type.clone(),
            summary: doc.summary_description.clone(),
            pages: doc
                .pages
                .iter()
                .map(|p| PageBrief {
                    page_number: p.page_number,
                    summary: p.summary_description.clone(),
                })
                .collect(),
        }
    }
}
