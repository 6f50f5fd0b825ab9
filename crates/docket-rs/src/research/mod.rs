//! External web research collaborators.
//!
//! Two narrow interfaces: [`SearchProvider`] for cheap, unlimited
//! search, and [`PageFetcher`] for full-page retrieval. The tool layer
//! wires them into the quota and approval machinery; nothing here
//! knows about either.

pub mod fetch;
pub mod search;

// Re-export commonly used items at the module level.
pub use fetch::{FETCH_USER_AGENT, FetchFuture, HttpPageFetcher, PageFetcher};
pub use search::{
    DEFAULT_SEARCH_API_URL, HttpSearchProvider, SearchFuture, SearchHit, SearchProvider,
};
