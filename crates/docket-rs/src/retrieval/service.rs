//! Quota-mediated access to the most expensive retrieval tier.
//!
//! [`RetrievalService`] fronts the corpus index: the two cheap tiers
//! pass straight through, while [`RetrievalService::page_images`]
//! checks the page-image quota up front and charges it afterwards for
//! the pages that actually produced image data.

use crate::corpus::CorpusIndex;
use crate::retrieval::quota::{QuotaError, QuotaGuard, QuotaResource};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Why a retrieval request failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    #[error("document {document_id} not found")]
    NotFound { document_id: String },
    #[error("page retrieval limit reached ({limit})")]
    QuotaAtLimit { limit: u32 },
    #[error("requesting {requested} pages would exceed the limit, {remaining} remaining")]
    QuotaWouldExceed { requested: u32, remaining: u32 },
}

impl From<QuotaError> for RetrievalError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::AtLimit { limit } => RetrievalError::QuotaAtLimit { limit },
            QuotaError::WouldExceed {
                requested,
                remaining,
            } => RetrievalError::QuotaWouldExceed {
                requested,
                remaining,
            },
        }
    }
}

/// One requested page, resolved independently of its siblings.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The page resolved to image data, returned as a
    /// `data:image/png;base64,…` payload string.
    Image {
        page_number: u32,
        summary: String,
        data: String,
    },
    /// The page could not be served. The request as a whole still
    /// succeeds; only this entry carries the reason.
    Error { page_number: u32, reason: String },
}

impl PageOutcome {
    pub fn page_number(&self) -> u32 {
        match self {
            PageOutcome::Image { page_number, .. } | PageOutcome::Error { page_number, .. } => {
                *page_number
            }
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, PageOutcome::Image { .. })
    }
}

/// Result of one page-image request.
#[derive(Debug, Clone)]
pub struct PageFetch {
    pub document_id: String,
    pub title: String,
    /// Per-page outcomes, in request order.
    pub pages: Vec<PageOutcome>,
    /// Pages that produced image data; what the quota was charged.
    pub retrieved: u32,
    /// Quota allowance left after this request.
    pub remaining: u32,
}

/// Serves page images from the corpus under the session quota.
pub struct RetrievalService {
    index: Arc<CorpusIndex>,
    quota: Arc<QuotaGuard>,
}

impl RetrievalService {
    pub fn new(index: Arc<CorpusIndex>, quota: Arc<QuotaGuard>) -> Self {
        Self { index, quota }
    }

    /// The underlying index, for the unguarded listing and summary
    /// tiers.
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// The session quota shared with other guarded retrieval paths.
    pub fn quota(&self) -> &Arc<QuotaGuard> {
        &self.quota
    }

    /// Fetch page images from one document.
    ///
    /// The quota check runs before anything is resolved and counts the
    /// *requested* pages; the charge afterwards counts only pages that
    /// produced image data. A request refused by the quota, or naming
    /// an unknown document, consumes nothing.
    ///
    /// Within an accepted request each page resolves independently: an
    /// unknown page number or an unreadable image file becomes a
    /// [`PageOutcome::Error`] entry instead of failing the call.
    pub fn page_images(
        &self,
        document_id: &str,
        page_numbers: &[u32],
    ) -> Result<PageFetch, RetrievalError> {
        self.quota
            .try_reserve(QuotaResource::PageImages, page_numbers.len() as u32)?;

        let doc = self
            .index
            .document(document_id)
            .ok_or_else(|| RetrievalError::NotFound {
                document_id: document_id.to_string(),
            })?;
        let by_number: HashMap<u32, usize> = doc
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.page_number, i))
            .collect();

        let mut pages = Vec::with_capacity(page_numbers.len());
        for &number in page_numbers {
            let Some(&slot) = by_number.get(&number) else {
                pages.push(PageOutcome::Error {
                    page_number: number,
                    reason: format!("Page {number} not found in document"),
                });
                continue;
            };
            let record = &doc.pages[slot];
            let path = self.index.resolve_path(&record.image_path);
            if !path.exists() {
                pages.push(PageOutcome::Error {
                    page_number: number,
                    reason: format!("Image file not found: {}", path.display()),
                });
                continue;
            }
            match std::fs::read(&path) {
                Ok(bytes) => pages.push(PageOutcome::Image {
                    page_number: number,
                    summary: record.summary_description.clone(),
                    data: format!("data:image/png;base64,{}", BASE64.encode(&bytes)),
                }),
                Err(e) => pages.push(PageOutcome::Error {
                    page_number: number,
                    reason: format!("Error loading image: {e}"),
                }),
            }
        }

        let retrieved = pages.iter().filter(|p| p.is_image()).count() as u32;
        let remaining = self.quota.commit(QuotaResource::PageImages, retrieved);
        debug!(
            "Served {retrieved}/{} page image(s) from {document_id}, {remaining} remaining",
            page_numbers.len()
        );

        Ok(PageFetch {
            document_id: document_id.to_string(),
            title: doc.title.clone(),
            pages,
            retrieved,
            remaining,
        })
    }
}
