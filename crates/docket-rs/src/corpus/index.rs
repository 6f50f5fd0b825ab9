//! In-memory corpus index with tiered, cheap-first views.
//!
//! [`CorpusIndex::load`] reads the index file once at startup; every
//! later lookup is served from memory. The two views exposed here are
//! deliberately free of image data: [`CorpusIndex::list_documents`]
//! costs nothing and [`CorpusIndex::page_summaries`] costs one
//! approval, so an agent can narrow down to the handful of pages worth
//! spending real page-image quota on.

use crate::corpus::model::{
    CorpusFile, CorpusMetadata, DocumentOverview, DocumentPageSummaries, DocumentRecord,
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the index file inside a corpus directory.
pub const INDEX_FILE_NAME: &str = "corpus_index.json";

/// Why a corpus index could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum CorpusLoadError {
    #[error("failed to read corpus index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corpus index {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only view over an indexed corpus.
///
/// Documents keep their index-file order for listings; lookups by id
/// go through a side map so both are cheap.
#[derive(Debug)]
pub struct CorpusIndex {
    base_dir: PathBuf,
    metadata: CorpusMetadata,
    documents: Vec<DocumentRecord>,
    by_id: HashMap<String, usize>,
}

impl CorpusIndex {
    /// Load an index file. `base_dir` anchors the relative image and
    /// PDF paths stored in the index.
    ///
    /// Parsing validates structure only; a record whose `page_count`
    /// disagrees with its page list is accepted as-is.
    pub fn load(
        index_path: impl AsRef<Path>,
        base_dir: impl Into<PathBuf>,
    ) -> Result<Self, CorpusLoadError> {
        let index_path = index_path.as_ref();
        let json = std::fs::read_to_string(index_path).map_err(|e| CorpusLoadError::Io {
            path: index_path.to_path_buf(),
            source: e,
        })?;
        let file: CorpusFile =
            serde_json::from_str(&json).map_err(|e| CorpusLoadError::Malformed {
                path: index_path.to_path_buf(),
                source: e,
            })?;

        let index = Self::from_file(file, base_dir);
        info!(
            "Loaded corpus index from {} ({} documents, {} pages)",
            index_path.display(),
            index.documents.len(),
            index.metadata.total_pages
        );
        Ok(index)
    }

    /// Load from a corpus directory, assuming the conventional
    /// [`INDEX_FILE_NAME`] inside it.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, CorpusLoadError> {
        let dir = dir.into();
        Self::load(dir.join(INDEX_FILE_NAME), dir)
    }

    /// Build an index from an already-parsed file.
    pub fn from_file(file: CorpusFile, base_dir: impl Into<PathBuf>) -> Self {
        let by_id = file
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.document_id.clone(), i))
            .collect();
        Self {
            base_dir: base_dir.into(),
            metadata: file.metadata,
            documents: file.documents,
            by_id,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn metadata(&self) -> &CorpusMetadata {
        &self.metadata
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up one document by id.
    pub fn document(&self, id: &str) -> Option<&DocumentRecord> {
        self.by_id.get(id).map(|&i| &self.documents[i])
    }

    /// Absolute path of a page image, resolved against the base
    /// directory.
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Cheapest tier: every document's listing row, in index order.
    /// Read-only; calling it twice returns the same rows.
    pub fn list_documents(&self) -> Vec<DocumentOverview> {
        self.documents.iter().map(DocumentOverview::from).collect()
    }

    /// Mid tier: page-level summaries for the requested documents.
    ///
    /// Unknown ids are silently omitted rather than failing the whole
    /// request; callers treat an empty map as "nothing matched".
    pub fn page_summaries(&self, ids: &[String]) -> BTreeMap<String, DocumentPageSummaries> {
        let mut out = BTreeMap::new();
        for id in ids {
            if let Some(doc) = self.document(id) {
                out.insert(id.clone(), DocumentPageSummaries::from(doc));
            }
        }
        out
    }
}
