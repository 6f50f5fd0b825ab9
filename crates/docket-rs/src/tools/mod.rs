//! The session's tool surface.
//!
//! Every capability the analysis exercises (corpus listings, page summaries,
//! page images, web search, web fetch) is a [`Tool`] trait implementor. Tools
//! are collected into a [`ToolSet`] which handles dispatch, validation,
//! truncation, and timeouts, and which tracks the review-required names the
//! workflow suspends on.
//!
//! # Defining tools
//!
//! - **`impl Tool`** — full struct with [`Tool::definition()`] and
//!   [`Tool::execute()`]. All five session tools work this way, holding their
//!   shared state (`Arc<RetrievalService>`, provider handles, the quota guard)
//!   as fields.
//! - **[`DisabledTool`]** — wraps a tool definition but always returns an
//!   error. Use for feature-gated tools callers can see but not invoke, such
//!   as `web_search` without an API key.
//!
//! # Submodules
//!
//! - [`core`] — [`Tool`] trait, [`ToolSet`], [`DisabledTool`], helpers.
//! - [`spec`] — [`ToolSpec`](spec::ToolSpec) builder for structured tool
//!   descriptions with `when_to_use` / `when_not_to_use` guidance.
//! - [`corpus_tools`] — the three tiered corpus tools.
//! - [`research_tools`] — `web_search` and `web_fetch`.

pub mod core;
pub mod corpus_tools;
pub mod research_tools;
pub mod spec;

// Re-export commonly used items at the module level.
pub use self::core::{DisabledTool, Tool, ToolFuture, ToolSet};
pub use self::core::{
    DEFAULT_MAX_RESULT_BYTES, DEFAULT_TOOL_TIMEOUT, parse_tool_args, truncate_result,
    validate_tool_arguments,
};
pub use corpus_tools::{GetDocumentPagesTool, GetDocumentsTool, ListDocumentsTool};
pub use research_tools::{MAX_FETCH_CHARS, WebFetchTool, WebSearchTool};
pub use spec::ToolSpec;
