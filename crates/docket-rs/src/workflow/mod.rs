//! Workflows the approval driver can run.
//!
//! A workflow is anything implementing [`crate::approval::Workflow`]; this
//! module holds the concrete ones. [`triage`] is the deterministic
//! corpus-walk used by the `docket` binary.

pub mod triage;

// Re-export commonly used items at the module level.
pub use triage::{TriageConfig, TriageWorkflow, initial_context_digest};
