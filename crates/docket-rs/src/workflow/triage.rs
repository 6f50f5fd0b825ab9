//! Deterministic corpus-walk triage.
//!
//! [`TriageWorkflow`] is the reference [`Workflow`] implementation: it walks
//! the corpus tier by tier (listing, then page summaries for every document,
//! then first-page images per document, then any configured web research),
//! suspending before each guarded step so the driver can collect reviewer
//! decisions. Rejected steps are recorded in the transcript and the walk
//! continues; the final output is the concatenated transcript.

use crate::approval::{
    Decision, PendingAction, ResumeInstruction, ReviewPolicy, Suspension, TurnFuture, Workflow,
    WorkflowTurn,
};
use crate::corpus::CorpusIndex;
use crate::tools::ToolSet;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shape of one triage run.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Page numbers fetched from every document during the image pass.
    /// Empty skips the pass.
    pub pages_per_document: Vec<u32>,
    /// Unguarded searches run before the fetch pass; results land in the
    /// transcript.
    pub search_queries: Vec<String>,
    /// URLs fetched (guarded, one action per URL) during the research pass.
    pub fetch_urls: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            pages_per_document: vec![1],
            search_queries: Vec::new(),
            fetch_urls: Vec::new(),
        }
    }
}

/// Where the walk currently stands. Suspended phases carry the actions the
/// pending decisions refer to.
enum Phase {
    New,
    Summaries { actions: Vec<PendingAction> },
    Images { actions: Vec<PendingAction> },
    Fetches { actions: Vec<PendingAction> },
    Done,
}

/// The deterministic corpus-walk workflow.
pub struct TriageWorkflow {
    tools: Arc<ToolSet>,
    index: Arc<CorpusIndex>,
    config: TriageConfig,
    /// Decision policy per review-required tool, cloned into every
    /// suspension.
    policies: HashMap<String, ReviewPolicy>,
    phase: Phase,
    sections: Vec<String>,
}

impl TriageWorkflow {
    /// Build a workflow over the given tool set and index.
    ///
    /// Every tool the set marks review-required gets an allow-all policy;
    /// tools outside that set never suspend in the first place.
    pub fn new(tools: Arc<ToolSet>, index: Arc<CorpusIndex>, config: TriageConfig) -> Self {
        let policies = tools
            .review_required_tools()
            .into_iter()
            .map(|name| (name, ReviewPolicy::allow_all()))
            .collect();
        Self {
            tools,
            index,
            config,
            policies,
            phase: Phase::New,
            sections: Vec::new(),
        }
    }

    fn suspend(&mut self, phase: Phase) -> WorkflowTurn {
        let actions = match &phase {
            Phase::Summaries { actions }
            | Phase::Images { actions }
            | Phase::Fetches { actions } => actions.clone(),
            Phase::New | Phase::Done => Vec::new(),
        };
        self.phase = phase;
        WorkflowTurn::Suspended(Suspension {
            actions,
            policies: self.policies.clone(),
        })
    }

    fn finish(&mut self) -> WorkflowTurn {
        self.phase = Phase::Done;
        WorkflowTurn::Finished {
            output: self.sections.join("\n\n"),
        }
    }

    /// Execute one suspension's actions according to the reviewer decisions.
    ///
    /// Runs sequentially: the quota guard's reserve/commit pairs are not
    /// atomic across concurrent callers.
    async fn settle(&mut self, actions: &[PendingAction], decisions: &[Decision]) {
        for (action, decision) in actions.iter().zip(decisions) {
            match decision {
                Decision::Approve => {
                    let result = self
                        .tools
                        .execute(&action.tool_name, &action.arguments.to_string())
                        .await;
                    self.sections.push(result);
                }
                Decision::Edit { new_arguments } => {
                    info!("Running '{}' with reviewer-edited arguments", action.tool_name);
                    let result = self
                        .tools
                        .execute(&action.tool_name, &new_arguments.to_string())
                        .await;
                    self.sections.push(result);
                }
                Decision::Reject => {
                    info!("Reviewer rejected '{}'", action.tool_name);
                    self.sections.push(rejection_result(&action.tool_name));
                }
            }
        }
    }

    /// Queue the image pass, or skip ahead when it is configured away.
    async fn begin_images(&mut self) -> WorkflowTurn {
        let pages = self.config.pages_per_document.clone();
        if pages.is_empty() {
            return self.begin_research().await;
        }
        let actions: Vec<PendingAction> = self
            .index
            .list_documents()
            .iter()
            .map(|doc| {
                PendingAction::new(
                    "get_document_pages",
                    serde_json::json!({
                        "document_id": doc.id,
                        "page_numbers": pages.clone(),
                    }),
                )
            })
            .collect();
        self.suspend(Phase::Images { actions })
    }

    /// Run the unguarded searches, then queue the guarded fetches or finish.
    async fn begin_research(&mut self) -> WorkflowTurn {
        let queries = self.config.search_queries.clone();
        if !queries.is_empty() {
            // Searches are independent and draw no quota, so the batch
            // runs concurrently. Results land in query order.
            let tools = Arc::clone(&self.tools);
            let futures: Vec<_> = queries
                .iter()
                .map(|query| {
                    let tools = Arc::clone(&tools);
                    let args = serde_json::json!({ "query": query }).to_string();
                    async move { tools.execute("web_search", &args).await }
                })
                .collect();
            self.sections.extend(futures::future::join_all(futures).await);
        }

        let urls = self.config.fetch_urls.clone();
        if urls.is_empty() {
            return self.finish();
        }
        let actions: Vec<PendingAction> = urls
            .iter()
            .map(|url| PendingAction::new("web_fetch", serde_json::json!({ "url": url })))
            .collect();
        self.suspend(Phase::Fetches { actions })
    }
}

impl Workflow for TriageWorkflow {
    fn start(&mut self, session_id: &str) -> TurnFuture<'_> {
        let session_id = session_id.to_string();
        Box::pin(async move {
            let ids: Vec<String> = self
                .index
                .list_documents()
                .iter()
                .map(|doc| doc.id.clone())
                .collect();
            info!(
                "Triage session {session_id} starting over {} document(s)",
                ids.len()
            );

            let digest = initial_context_digest(&self.index);
            self.sections.push(format!("DATA ROOM CONTENTS:\n\n{digest}"));

            let listing = self.tools.execute("list_documents", "{}").await;
            self.sections.push(listing);

            if ids.is_empty() {
                return self.finish();
            }

            let actions = vec![PendingAction::new(
                "get_documents",
                serde_json::json!({ "document_ids": ids }),
            )];
            self.suspend(Phase::Summaries { actions })
        })
    }

    fn resume(&mut self, session_id: &str, instruction: ResumeInstruction) -> TurnFuture<'_> {
        let session_id = session_id.to_string();
        Box::pin(async move {
            debug!(
                "Triage session {session_id} resuming with {} decision(s)",
                instruction.decisions.len()
            );
            let phase = std::mem::replace(&mut self.phase, Phase::Done);
            match phase {
                Phase::New | Phase::Done => {
                    warn!("Resume for {session_id} arrived with no suspension outstanding");
                    self.finish()
                }
                Phase::Summaries { actions } => {
                    self.settle(&actions, &instruction.decisions).await;
                    self.begin_images().await
                }
                Phase::Images { actions } => {
                    self.settle(&actions, &instruction.decisions).await;
                    self.begin_research().await
                }
                Phase::Fetches { actions } => {
                    self.settle(&actions, &instruction.decisions).await;
                    self.finish()
                }
            }
        })
    }
}

/// Format the document-summary block used to seed a session.
///
/// One block per document, blank-line separated:
///
/// ```text
/// Document doc_001: Master Services Agreement
/// Type: contract
/// Pages: 12
/// Summary: ...
/// ```
pub fn initial_context_digest(index: &CorpusIndex) -> String {
    let blocks: Vec<String> = index
        .list_documents()
        .iter()
        .map(|doc| {
            format!(
                "Document {}: {}\nType: {}\nPages: {}\nSummary: {}",
                doc.id, doc.title, doc.document_type, doc.page_count, doc.summary_description
            )
        })
        .collect();
    blocks.join("\n\n")
}

/// Tool-result text recorded when a reviewer rejects an action.
fn rejection_result(tool_name: &str) -> String {
    format!("Tool call '{tool_name}' was rejected by the reviewer. The operation was not executed.")
}

// ── Tests ──────────────────────────────────────────────────────────
