//! Assembling and persisting a corpus index.
//!
//! Ingest pipelines build up a [`CorpusBuilder`] one document at a
//! time, then [`write_index`] the result. Totals in the metadata block
//! are always derived from the document list here, never trusted from
//! the caller.

use crate::corpus::index::INDEX_FILE_NAME;
use crate::corpus::model::{CorpusFile, CorpusMetadata, DocumentRecord};
use std::path::{Path, PathBuf};
use tracing::info;

/// Conventional document id for the `index`-th document (0-based).
pub fn document_id(index: usize) -> String {
    format!("doc_{:03}", index + 1)
}

/// Conventional relative path for one rendered page image.
pub fn page_image_path(document_id: &str, page_number: u32) -> String {
    format!("page_images/{document_id}/page_{page_number:03}.png")
}

/// Accumulates documents and derives corpus-wide totals.
#[derive(Default)]
pub struct CorpusBuilder {
    documents: Vec<DocumentRecord>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: DocumentRecord) -> &mut Self {
        self.documents.push(document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Finish the corpus, computing the metadata block from the
    /// accumulated documents.
    pub fn finish(self) -> CorpusFile {
        let metadata = CorpusMetadata {
            total_documents: self.documents.len() as u32,
            total_pages: self.documents.iter().map(|d| d.page_count).sum(),
            total_tokens: self.documents.iter().map(|d| d.total_tokens).sum(),
        };
        CorpusFile {
            metadata,
            documents: self.documents,
        }
    }
}

/// Atomic write: serialize to a temp file in the corpus directory,
/// then rename into place. Returns the final index path.
pub fn write_index(corpus: &CorpusFile, base_dir: impl AsRef<Path>) -> Result<PathBuf, String> {
    let base_dir = base_dir.as_ref();
    std::fs::create_dir_all(base_dir)
        .map_err(|e| format!("Failed to create corpus dir: {e}"))?;

    let final_path = base_dir.join(INDEX_FILE_NAME);
    let tmp_path = base_dir.join(format!(".{INDEX_FILE_NAME}.tmp"));

    let json = serde_json::to_string_pretty(corpus)
        .map_err(|e| format!("Failed to serialize corpus index: {e}"))?;
    std::fs::write(&tmp_path, json).map_err(|e| format!("Failed to write temp index: {e}"))?;
    std::fs::rename(&tmp_path, &final_path)
        .map_err(|e| format!("Failed to rename index into place: {e}"))?;

    info!(
        "Wrote corpus index to {} ({} documents, {} pages)",
        final_path.display(),
        corpus.metadata.total_documents,
        corpus.metadata.total_pages
    );
    Ok(final_path)
}
