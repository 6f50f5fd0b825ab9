//! The suspend/review/resume state machine.
//!
//! A [`Workflow`] runs until it either finishes or suspends with a
//! batch of pending actions. The [`ApprovalDriver`] collects one
//! decision per action from its [`Reviewer`] and resumes the workflow
//! with the batch, carrying the same session id across every cycle so
//! the workflow's internal state survives each suspension. A session
//! ends `Completed` with the workflow's output, or `Aborted` when
//! decision collection comes up short or the iteration ceiling is hit.

use crate::approval::action::{Decision, PendingAction, ResumeInstruction, ReviewPolicy};
use crate::approval::reviewer::Reviewer;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{info, warn};

/// Ceiling on suspend/resume cycles per session, a safety valve
/// against interrupt loops that never converge.
pub const MAX_ITERATIONS: u32 = 50;

/// Generate a unique session ID for a driver run.
pub fn generate_session_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // Use a counter to handle sub-nanosecond calls.
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sess-{ts:x}-{count:04x}")
}

// ── Workflow ───────────────────────────────────────────────────────

/// A batch of pending actions a workflow stopped on.
#[derive(Debug, Clone)]
pub struct Suspension {
    /// The tool calls awaiting review, in the order the workflow
    /// queued them.
    pub actions: Vec<PendingAction>,
    /// Review policies keyed by tool name. An action whose name has no
    /// entry here gets the empty policy, which allows nothing.
    pub policies: HashMap<String, ReviewPolicy>,
}

/// What one start/resume call produced.
#[derive(Debug, Clone)]
pub enum WorkflowTurn {
    /// The workflow cannot proceed without decisions.
    Suspended(Suspension),
    /// The workflow ran to completion.
    Finished { output: String },
}

pub type TurnFuture<'a> = Pin<Box<dyn Future<Output = WorkflowTurn> + Send + 'a>>;

/// A resumable computation driven by the approval loop.
///
/// Implementations keep their own progress between calls; the driver
/// passes the same `session_id` to `start` and every `resume` so that
/// state can be keyed to the session.
pub trait Workflow: Send {
    /// Begin a fresh session.
    fn start(&mut self, session_id: &str) -> TurnFuture<'_>;

    /// Continue after a suspension, with one decision per pending
    /// action in batch order.
    fn resume(&mut self, session_id: &str, instruction: ResumeInstruction) -> TurnFuture<'_>;
}

// ── Session reporting ──────────────────────────────────────────────

/// Where a session ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Suspended,
    Resuming,
    Completed,
    Aborted,
}

/// Summary of one driver run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub status: SessionStatus,
    /// Completed suspend/resume cycles.
    pub iterations: u32,
    /// The workflow's output, present when the session completed.
    pub final_output: Option<String>,
    /// RFC 3339 timestamp of when the driver returned.
    pub finished_at: String,
}

// ── ApprovalDriver ─────────────────────────────────────────────────

/// Runs a [`Workflow`] to completion under a [`Reviewer`].
pub struct ApprovalDriver<R: Reviewer> {
    reviewer: R,
    max_iterations: u32,
}

impl<R: Reviewer> ApprovalDriver<R> {
    pub fn new(reviewer: R) -> Self {
        Self {
            reviewer,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Override the iteration ceiling.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Drive `workflow` until it finishes, decision collection fails,
    /// or the iteration ceiling is reached.
    pub async fn run<W: Workflow + ?Sized>(&self, workflow: &mut W) -> SessionReport {
        let session_id = generate_session_id();
        info!("Starting approval-driven session {session_id}");

        let mut iterations = 0u32;
        let mut turn = workflow.start(&session_id).await;

        let (status, final_output) = loop {
            match turn {
                WorkflowTurn::Finished { output } => {
                    info!("Session {session_id} complete after {iterations} iteration(s)");
                    break (SessionStatus::Completed, Some(output));
                }
                WorkflowTurn::Suspended(suspension) => {
                    if iterations >= self.max_iterations {
                        warn!("Maximum iterations reached ({iterations}). Aborting {session_id}.");
                        break (SessionStatus::Aborted, None);
                    }
                    iterations += 1;
                    info!(
                        "Approval required (iteration {iterations}, {} action(s))",
                        suspension.actions.len()
                    );

                    let decisions = self.collect_decisions(&suspension);
                    if decisions.len() != suspension.actions.len() || decisions.is_empty() {
                        warn!("No decisions collected. Aborting {session_id}.");
                        break (SessionStatus::Aborted, None);
                    }

                    info!("Resuming execution with {} decision(s)", decisions.len());
                    turn = workflow
                        .resume(&session_id, ResumeInstruction { decisions })
                        .await;
                }
            }
        };

        SessionReport {
            session_id,
            status,
            iterations,
            final_output,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// One decision per action, stopping early if the reviewer
    /// abstains. An incomplete batch is returned as-is; the caller
    /// aborts rather than resume with holes, because decisions match
    /// actions positionally.
    fn collect_decisions(&self, suspension: &Suspension) -> Vec<Decision> {
        let empty = ReviewPolicy::default();
        let mut decisions = Vec::with_capacity(suspension.actions.len());
        for action in &suspension.actions {
            let policy = suspension.policies.get(&action.tool_name).unwrap_or(&empty);
            match self.reviewer.review(action, policy) {
                Some(decision) => decisions.push(normalize_decision(action, decision)),
                None => {
                    warn!("Reviewer produced no decision for '{}'", action.tool_name);
                    break;
                }
            }
        }
        decisions
    }
}

/// An `Edit` whose replacement is not a JSON object degrades to
/// approving the original arguments. Never a reject, never an error.
fn normalize_decision(action: &PendingAction, decision: Decision) -> Decision {
    match &decision {
        Decision::Edit { new_arguments } if !new_arguments.is_object() => {
            warn!(
                "Edit replacement for '{}' is not a JSON object. Using original arguments.",
                action.tool_name
            );
            Decision::Approve
        }
        _ => decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::reviewer::{AutoApprover, ScriptedReviewer};
    use serde_json::json;

    /// Suspends a fixed number of times with a single-action batch,
    /// then finishes. Records every session id and resume instruction
    /// it sees.
    struct CountingWorkflow {
        suspensions: u32,
        emitted: u32,
        policy_for: Option<ReviewPolicy>,
        seen_session_ids: Vec<String>,
        received: Vec<ResumeInstruction>,
    }

    impl CountingWorkflow {
        fn new(suspensions: u32) -> Self {
            Self {
                suspensions,
                emitted: 0,
                policy_for: Some(ReviewPolicy::allow_all()),
                seen_session_ids: Vec::new(),
                received: Vec::new(),
            }
        }

        fn without_policy(mut self) -> Self {
            self.policy_for = None;
            self
        }

        fn next_turn(&mut self) -> WorkflowTurn {
            if self.emitted >= self.suspensions {
                return WorkflowTurn::Finished {
                    output: format!("done after {} suspensions", self.emitted),
                };
            }
            self.emitted += 1;
            let action = PendingAction::new("get_documents", json!({"document_ids": ["doc_001"]}));
            let mut policies = HashMap::new();
            if let Some(policy) = &self.policy_for {
                policies.insert("get_documents".to_string(), policy.clone());
            }
            WorkflowTurn::Suspended(Suspension {
                actions: vec![action],
                policies,
            })
        }
    }

    impl Workflow for CountingWorkflow {
        fn start(&mut self, session_id: &str) -> TurnFuture<'_> {
            self.seen_session_ids.push(session_id.to_string());
            let turn = self.next_turn();
            Box::pin(async move { turn })
        }

        fn resume(&mut self, session_id: &str, instruction: ResumeInstruction) -> TurnFuture<'_> {
            self.seen_session_ids.push(session_id.to_string());
            self.received.push(instruction);
            let turn = self.next_turn();
            Box::pin(async move { turn })
        }
    }

    #[tokio::test]
    async fn completes_without_suspensions() {
        let mut workflow = CountingWorkflow::new(0);
        let report = ApprovalDriver::new(AutoApprover).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.iterations, 0);
        assert_eq!(
            report.final_output.as_deref(),
            Some("done after 0 suspensions")
        );
        assert!(report.session_id.starts_with("sess-"));
    }

    #[tokio::test]
    async fn one_cycle_resumes_with_the_decision() {
        let mut workflow = CountingWorkflow::new(1);
        let report = ApprovalDriver::new(AutoApprover).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.iterations, 1);
        assert_eq!(workflow.received.len(), 1);
        assert_eq!(workflow.received[0].decisions, vec![Decision::Approve]);
    }

    #[tokio::test]
    async fn session_id_is_stable_across_resumes() {
        let mut workflow = CountingWorkflow::new(3);
        let report = ApprovalDriver::new(AutoApprover).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(workflow.seen_session_ids.len(), 4);
        assert!(
            workflow
                .seen_session_ids
                .iter()
                .all(|id| *id == report.session_id)
        );
    }

    #[tokio::test]
    async fn aborts_at_exactly_the_iteration_ceiling() {
        // Suspends more times than the ceiling allows; the driver must
        // stop after exactly MAX_ITERATIONS resumes.
        let mut workflow = CountingWorkflow::new(u32::MAX);
        let report = ApprovalDriver::new(AutoApprover).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Aborted);
        assert_eq!(report.iterations, MAX_ITERATIONS);
        assert_eq!(workflow.received.len(), MAX_ITERATIONS as usize);
        assert!(report.final_output.is_none());
    }

    #[tokio::test]
    async fn aborts_when_no_decisions_are_collected() {
        let mut workflow = CountingWorkflow::new(2);
        let reviewer = ScriptedReviewer::new([]);
        let report = ApprovalDriver::new(reviewer).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Aborted);
        assert_eq!(report.iterations, 1);
        assert!(workflow.received.is_empty());
    }

    #[tokio::test]
    async fn missing_policy_means_no_decision_and_abort() {
        let mut workflow = CountingWorkflow::new(1).without_policy();
        let report = ApprovalDriver::new(AutoApprover).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Aborted);
        assert!(workflow.received.is_empty());
    }

    #[tokio::test]
    async fn malformed_edit_degrades_to_approving_the_original() {
        let mut workflow = CountingWorkflow::new(1);
        let reviewer = ScriptedReviewer::new([Decision::Edit {
            new_arguments: json!(["not", "an", "object"]),
        }]);
        let report = ApprovalDriver::new(reviewer).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(workflow.received[0].decisions, vec![Decision::Approve]);
    }

    #[tokio::test]
    async fn well_formed_edit_passes_through() {
        let mut workflow = CountingWorkflow::new(1);
        let replacement = json!({"document_ids": ["doc_002", "doc_003"]});
        let reviewer = ScriptedReviewer::new([Decision::Edit {
            new_arguments: replacement.clone(),
        }]);
        let report = ApprovalDriver::new(reviewer).run(&mut workflow).await;

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(
            workflow.received[0].decisions,
            vec![Decision::Edit {
                new_arguments: replacement
            }]
        );
    }

    #[tokio::test]
    async fn smaller_ceiling_is_respected() {
        let mut workflow = CountingWorkflow::new(u32::MAX);
        let report = ApprovalDriver::new(AutoApprover)
            .with_max_iterations(3)
            .run(&mut workflow)
            .await;

        assert_eq!(report.status, SessionStatus::Aborted);
        assert_eq!(report.iterations, 3);
    }

    #[test]
    fn session_ids_are_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.starts_with("sess-"));
    }
}
