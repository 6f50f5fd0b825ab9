//! Human-in-the-loop approval for guarded operations.
//!
//! Expensive or outward-facing tool calls do not run directly: the
//! workflow suspends with a batch of pending actions, a reviewer
//! decides each one (approve, edit, or reject), and the workflow
//! resumes with the decisions applied. The driver carries one stable
//! session id through every cycle and enforces an iteration ceiling.
//!
//! # Submodules
//!
//! - [`action`] — [`PendingAction`], [`ReviewPolicy`], [`Decision`],
//!   [`ResumeInstruction`], and typed action classification.
//! - [`render`] — bounded human-readable action descriptions.
//! - [`reviewer`] — the [`Reviewer`] trait with console, automatic,
//!   and scripted implementations.
//! - [`driver`] — the [`Workflow`] abstraction and [`ApprovalDriver`]
//!   state machine.

pub mod action;
pub mod driver;
pub mod render;
pub mod reviewer;

// Re-export commonly used items at the module level.
pub use action::{
    ActionKind, Decision, DecisionKind, PendingAction, ResumeInstruction, ReviewPolicy,
};
pub use driver::{
    ApprovalDriver, MAX_ITERATIONS, SessionReport, SessionStatus, Suspension, TurnFuture,
    Workflow, WorkflowTurn, generate_session_id,
};
pub use render::{MAX_VALUE_CHARS, elide, render_action};
pub use reviewer::{AutoApprover, ConsoleReviewer, Reviewer, ScriptedReviewer};
