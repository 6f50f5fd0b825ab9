//! Convenience re-exports for common `docket-rs` types.
//!
//! Meant to be glob-imported when building sessions:
//!
//! ```ignore
//! use docket_rs::prelude::*;
//! ```
//!
//! This pulls in the types needed for the vast majority of programs: the
//! corpus index, quota guard + retrieval service, [`Tool`] trait +
//! [`ToolSet`], the approval driver with its reviewers, and the triage
//! workflow. Specialized types (index writer internals, the token cost
//! model, action rendering) are intentionally excluded — import those
//! from their modules directly when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ToolDef, json_schema_for};

// ── Approval loop ───────────────────────────────────────────────────
pub use crate::approval::{
    ApprovalDriver, AutoApprover, ConsoleReviewer, Decision, PendingAction, ResumeInstruction,
    ReviewPolicy, Reviewer, ScriptedReviewer, SessionReport, SessionStatus, Suspension, Workflow,
    WorkflowTurn,
};

// ── Corpus ──────────────────────────────────────────────────────────
pub use crate::corpus::{CorpusIndex, DocumentOverview, DocumentRecord};

// ── Retrieval ───────────────────────────────────────────────────────
pub use crate::retrieval::{QuotaGuard, QuotaResource, RetrievalService};

// ── Research ────────────────────────────────────────────────────────
pub use crate::research::{HttpPageFetcher, PageFetcher, SearchProvider};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::spec::ToolSpec;
pub use crate::tools::{DisabledTool, Tool, ToolFuture, ToolSet, parse_tool_args};

// ── Workflow ────────────────────────────────────────────────────────
pub use crate::workflow::{TriageConfig, TriageWorkflow};
