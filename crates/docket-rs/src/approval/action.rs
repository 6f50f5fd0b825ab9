//! The pending-action protocol: what a suspended computation hands to
//! a reviewer, and what it gets back.
//!
//! A [`PendingAction`] is a snapshot of one tool call awaiting review.
//! Its [`ReviewPolicy`] names the decisions a reviewer may make; the
//! reviewer answers with a [`Decision`], and the whole batch is fed
//! back through a [`ResumeInstruction`] matched positionally to the
//! suspended actions.

use serde::{Deserialize, Serialize};

/// The decision categories a policy can allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    Edit,
    Reject,
}

impl DecisionKind {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionKind::Approve => "approve",
            DecisionKind::Edit => "edit",
            DecisionKind::Reject => "reject",
        }
    }
}

/// Which decisions a reviewer may make for one action.
///
/// The default policy allows nothing; a reviewer faced with it
/// produces no decision at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    pub allowed: Vec<DecisionKind>,
}

impl ReviewPolicy {
    /// Approve, edit, or reject.
    pub fn allow_all() -> Self {
        Self {
            allowed: vec![
                DecisionKind::Approve,
                DecisionKind::Edit,
                DecisionKind::Reject,
            ],
        }
    }

    /// Approve or reject, no edits.
    pub fn approve_or_reject() -> Self {
        Self {
            allowed: vec![DecisionKind::Approve, DecisionKind::Reject],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn permits(&self, kind: DecisionKind) -> bool {
        self.allowed.contains(&kind)
    }
}

/// A reviewer's verdict on one pending action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
    /// Run the tool with a full replacement argument set.
    Edit { new_arguments: serde_json::Value },
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::Approve => DecisionKind::Approve,
            Decision::Reject => DecisionKind::Reject,
            Decision::Edit { .. } => DecisionKind::Edit,
        }
    }
}

/// The decision batch handed back when a suspended session resumes,
/// one decision per pending action, in batch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeInstruction {
    pub decisions: Vec<Decision>,
}

/// One tool call frozen at a suspension point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub tool_name: String,
    /// The call's arguments as a JSON object.
    pub arguments: serde_json::Value,
}

impl PendingAction {
    pub fn new(tool_name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Classify the action into a known kind with a typed payload.
    /// Unrecognized tool names fall back to [`ActionKind::Other`];
    /// arguments that do not fit the expected shape classify with an
    /// empty payload rather than failing.
    pub fn kind(&self) -> ActionKind {
        fn parse<T: serde::de::DeserializeOwned + Default>(args: &serde_json::Value) -> T {
            serde_json::from_value(args.clone()).unwrap_or_default()
        }

        match self.tool_name.as_str() {
            "get_documents" => {
                let args: DocumentIdsArgs = parse(&self.arguments);
                ActionKind::DocumentSummaries {
                    document_ids: args.document_ids,
                }
            }
            "get_document_pages" => {
                let args: PageImagesArgs = parse(&self.arguments);
                ActionKind::PageImages {
                    document_id: args.document_id,
                    page_numbers: args.page_numbers,
                }
            }
            "web_fetch" => {
                let args: UrlArgs = parse(&self.arguments);
                ActionKind::WebFetch { url: args.url }
            }
            "write_file" | "edit_file" => {
                let args: PathArgs = parse(&self.arguments);
                ActionKind::FileWrite {
                    path: args.path.or(args.file_path),
                }
            }
            "task" => {
                let args: TaskArgs = parse(&self.arguments);
                ActionKind::Delegation {
                    description: args.description,
                }
            }
            _ => ActionKind::Other,
        }
    }
}

/// The closed set of action kinds the review surface knows how to
/// describe. Each variant carries the typed payload its rendering
/// draws on; anything else lands in `Other` and gets the generic
/// treatment.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    DocumentSummaries { document_ids: Vec<String> },
    PageImages { document_id: String, page_numbers: Vec<u32> },
    WebFetch { url: String },
    FileWrite { path: Option<String> },
    Delegation { description: Option<String> },
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentIdsArgs {
    #[serde(default)]
    document_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PageImagesArgs {
    #[serde(default)]
    document_id: String,
    #[serde(default)]
    page_numbers: Vec<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct UrlArgs {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct PathArgs {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskArgs {
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_wire_shapes() {
        assert_eq!(
            serde_json::to_value(&Decision::Approve).unwrap(),
            json!({"type": "approve"})
        );
        assert_eq!(
            serde_json::to_value(&Decision::Reject).unwrap(),
            json!({"type": "reject"})
        );
        assert_eq!(
            serde_json::to_value(&Decision::Edit {
                new_arguments: json!({"document_ids": ["doc_002"]})
            })
            .unwrap(),
            json!({"type": "edit", "new_arguments": {"document_ids": ["doc_002"]}})
        );
    }

    #[test]
    fn resume_instruction_round_trips() {
        let instruction = ResumeInstruction {
            decisions: vec![
                Decision::Approve,
                Decision::Edit {
                    new_arguments: json!({"url": "https://example.com"}),
                },
                Decision::Reject,
            ],
        };
        let wire = serde_json::to_string(&instruction).unwrap();
        let back: ResumeInstruction = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, instruction);
    }

    #[test]
    fn classifies_known_tool_names() {
        let action = PendingAction::new(
            "get_documents",
            json!({"document_ids": ["doc_001", "doc_003"]}),
        );
        assert_eq!(
            action.kind(),
            ActionKind::DocumentSummaries {
                document_ids: vec!["doc_001".into(), "doc_003".into()]
            }
        );

        let action = PendingAction::new(
            "get_document_pages",
            json!({"document_id": "doc_002", "page_numbers": [1, 4]}),
        );
        assert_eq!(
            action.kind(),
            ActionKind::PageImages {
                document_id: "doc_002".into(),
                page_numbers: vec![1, 4]
            }
        );

        let action = PendingAction::new("web_fetch", json!({"url": "https://example.com/filing"}));
        assert_eq!(
            action.kind(),
            ActionKind::WebFetch {
                url: "https://example.com/filing".into()
            }
        );

        for name in ["write_file", "edit_file"] {
            let action = PendingAction::new(name, json!({"path": "report.md", "content": "..."}));
            assert_eq!(
                action.kind(),
                ActionKind::FileWrite {
                    path: Some("report.md".into())
                }
            );
        }

        let action = PendingAction::new("task", json!({"description": "summarize findings"}));
        assert_eq!(
            action.kind(),
            ActionKind::Delegation {
                description: Some("summarize findings".into())
            }
        );
    }

    #[test]
    fn unknown_tool_name_is_other() {
        let action = PendingAction::new("shell", json!({"command": "ls"}));
        assert_eq!(action.kind(), ActionKind::Other);
    }

    #[test]
    fn malformed_arguments_classify_with_empty_payload() {
        let action = PendingAction::new("get_documents", json!("not an object"));
        assert_eq!(
            action.kind(),
            ActionKind::DocumentSummaries {
                document_ids: vec![]
            }
        );

        let action = PendingAction::new("web_fetch", json!({"url": 17}));
        assert_eq!(action.kind(), ActionKind::WebFetch { url: String::new() });
    }

    #[test]
    fn default_policy_allows_nothing() {
        let policy = ReviewPolicy::default();
        assert!(policy.is_empty());
        assert!(!policy.permits(DecisionKind::Approve));

        let policy = ReviewPolicy::allow_all();
        assert!(policy.permits(DecisionKind::Edit));
        assert!(ReviewPolicy::approve_or_reject().permits(DecisionKind::Reject));
        assert!(!ReviewPolicy::approve_or_reject().permits(DecisionKind::Edit));
    }
}
