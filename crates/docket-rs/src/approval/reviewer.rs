//! Reviewer implementations: who answers for a pending action.
//!
//! The state machine talks to a [`Reviewer`] and nothing else, so the
//! same driver runs against a console prompt, an auto-approving
//! policy, or a scripted queue. Every reviewer honors the same
//! contract: exactly one decision from the policy's allowed set, or no
//! decision at all when the policy allows nothing.

use crate::approval::action::{Decision, DecisionKind, PendingAction, ReviewPolicy};
use crate::approval::render::render_action;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Answers for pending actions.
///
/// `review` may block indefinitely (a human at a console); callers
/// needing bounded waits wrap their reviewer accordingly.
pub trait Reviewer: Send + Sync {
    /// Produce one decision consistent with `policy`, or `None` when
    /// the policy's allowed set is empty.
    fn review(&self, action: &PendingAction, policy: &ReviewPolicy) -> Option<Decision>;
}

// ── ConsoleReviewer ────────────────────────────────────────────────

/// Line-oriented console prompt: renders the action, offers a numbered
/// menu of the allowed decisions, and for an edit reads a replacement
/// argument object as one JSON line.
pub struct ConsoleReviewer;

impl ConsoleReviewer {
    fn read_line() -> Option<String> {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn prompt_kind(allowed: &[DecisionKind]) -> Option<DecisionKind> {
        loop {
            println!("Your decision:");
            for (idx, kind) in allowed.iter().enumerate() {
                println!("  {}. {}", idx + 1, kind.label());
            }
            print!("\nEnter your choice (1-{}): ", allowed.len());
            let _ = std::io::stdout().flush();

            let line = Self::read_line()?;
            match line.parse::<usize>() {
                Ok(choice) if (1..=allowed.len()).contains(&choice) => {
                    return Some(allowed[choice - 1]);
                }
                Ok(_) => println!("Invalid choice. Please try again.\n"),
                Err(_) => println!("Invalid input. Please enter a number.\n"),
            }
        }
    }

    fn prompt_edit(action: &PendingAction) -> Decision {
        println!("\nYou chose to edit the arguments.");
        println!("Current arguments:");
        println!(
            "{}",
            serde_json::to_string_pretty(&action.arguments)
                .unwrap_or_else(|_| action.arguments.to_string())
        );
        println!("\nProvide edited arguments as JSON:");

        let Some(line) = Self::read_line() else {
            println!("Invalid JSON. Using original arguments.");
            return Decision::Approve;
        };
        match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(value) if value.is_object() => Decision::Edit {
                new_arguments: value,
            },
            _ => {
                println!("Invalid JSON. Using original arguments.");
                Decision::Approve
            }
        }
    }
}

impl Reviewer for ConsoleReviewer {
    fn review(&self, action: &PendingAction, policy: &ReviewPolicy) -> Option<Decision> {
        if policy.is_empty() {
            return None;
        }
        println!("{}", render_action(action, policy));

        let kind = Self::prompt_kind(&policy.allowed)?;
        let decision = match kind {
            DecisionKind::Approve => Decision::Approve,
            DecisionKind::Reject => Decision::Reject,
            DecisionKind::Edit => Self::prompt_edit(action),
        };
        Some(decision)
    }
}

// ── AutoApprover ───────────────────────────────────────────────────

/// Approves everything its policy lets it approve. Falls back to
/// rejecting when approval is not on the menu, and abstains when
/// nothing is.
pub struct AutoApprover;

impl Reviewer for AutoApprover {
    fn review(&self, action: &PendingAction, policy: &ReviewPolicy) -> Option<Decision> {
        if policy.permits(DecisionKind::Approve) {
            debug!("Auto-approved pending action '{}'", action.tool_name);
            Some(Decision::Approve)
        } else if policy.permits(DecisionKind::Reject) {
            debug!("Auto-rejected pending action '{}'", action.tool_name);
            Some(Decision::Reject)
        } else {
            None
        }
    }
}

// ── ScriptedReviewer ───────────────────────────────────────────────

/// Replays a fixed decision sequence, for batch runs and tests.
///
/// Abstains once the script runs out, and refuses to hand over a
/// decision its policy does not permit.
pub struct ScriptedReviewer {
    script: Mutex<VecDeque<Decision>>,
}

impl ScriptedReviewer {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            script: Mutex::new(decisions.into_iter().collect()),
        }
    }

    /// Decisions not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&self, action: &PendingAction, policy: &ReviewPolicy) -> Option<Decision> {
        if policy.is_empty() {
            return None;
        }
        let decision = self.script.lock().unwrap().pop_front()?;
        if !policy.permits(decision.kind()) {
            warn!(
                "Scripted decision '{}' not permitted by the policy for '{}'",
                decision.kind().label(),
                action.tool_name
            );
            return None;
        }
        Some(decision)
    }
}
