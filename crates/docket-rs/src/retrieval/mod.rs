//! Tiered retrieval under hard session quotas.
//!
//! Access to the corpus is deliberately lopsided: listings are free,
//! page summaries are cheap, and full page images draw down a fixed
//! per-session allowance that never refills. The same guard also
//! meters external web fetches.
//!
//! # Submodules
//!
//! - [`quota`] — [`QuotaGuard`] counters and [`QuotaError`].
//! - [`service`] — [`RetrievalService`], the quota-checked page-image
//!   path.

pub mod quota;
pub mod service;

// Re-export commonly used items at the module level.
pub use quota::{PAGE_IMAGE_LIMIT, QuotaError, QuotaGuard, QuotaResource, WEB_FETCH_LIMIT};
pub use service::{PageFetch, PageOutcome, RetrievalError, RetrievalService};
