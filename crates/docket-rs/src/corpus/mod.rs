//! Document corpus: the indexed data room an analysis runs against.
//!
//! A corpus is a directory of page images plus one JSON index file
//! describing every document and page. Ingest writes the index once;
//! analysis loads it read-only and serves all cheap retrieval tiers
//! straight from memory.
//!
//! # Submodules
//!
//! - [`model`] — serde records for the on-disk index format.
//! - [`index`] — [`CorpusIndex`]: loading, id lookup, listing, page
//!   summaries.
//! - [`writer`] — [`CorpusBuilder`] and atomic index persistence, plus
//!   the `doc_NNN` / `page_NNN.png` naming conventions.
//! - [`tokens`] — patch-based vision-token cost estimation.

pub mod index;
pub mod model;
pub mod tokens;
pub mod writer;

// Re-export commonly used items at the module level.
pub use index::{CorpusIndex, CorpusLoadError, INDEX_FILE_NAME};
pub use model::{
    CorpusFile, CorpusMetadata, DocumentOverview, DocumentPageSummaries, DocumentRecord,
    PageBrief, PageRecord,
};
pub use tokens::{DEFAULT_COST_MODEL, MAX_PATCHES, PATCH_EDGE, estimate_image_tokens};
pub use writer::{CorpusBuilder, document_id, page_image_path, write_index};
