//! Human-readable rendering of pending actions.
//!
//! Reviewers decide from text, so every action gets a bounded-size
//! description: tool name, arguments with long values elided, the
//! allowed decisions, and a short guidance blurb matched to the
//! action's kind.

use crate::approval::action::{ActionKind, PendingAction, ReviewPolicy};

/// Longest argument value shown before eliding.
pub const MAX_VALUE_CHARS: usize = 200;

/// Truncate `value` to `max_chars` characters with a trailing marker.
/// Counts characters, not bytes, so multibyte text never splits.
pub fn elide(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn guidance(kind: &ActionKind) -> Option<[&'static str; 2]> {
    match kind {
        ActionKind::DocumentSummaries { .. } => Some([
            "This will retrieve page-by-page summaries for the specified documents.",
            "Review the document IDs and consider if you want to add or remove any.",
        ]),
        ActionKind::PageImages { .. } => Some([
            "This will retrieve full page images and draw down the session's page quota.",
            "Confirm these specific pages are worth spending retrievals on.",
        ]),
        ActionKind::WebFetch { .. } => Some([
            "This will fetch the complete content of this web page.",
            "Verify this is an authoritative source worth retrieving.",
        ]),
        ActionKind::FileWrite { .. } => Some([
            "This will save analysis findings to the filesystem.",
            "Review the content to ensure it meets quality standards.",
        ]),
        ActionKind::Delegation { .. } => Some([
            "This will delegate work to a specialized subagent.",
            "Review the task description to ensure it's clear and appropriate.",
        ]),
        ActionKind::Other => None,
    }
}

/// Render one pending action for a reviewer.
pub fn render_action(action: &PendingAction, policy: &ReviewPolicy) -> String {
    let mut lines = vec![
        "=".repeat(70),
        format!("PENDING ACTION: {}", action.tool_name),
        "=".repeat(70),
        String::new(),
    ];

    if let Some(map) = action.arguments.as_object()
        && !map.is_empty()
    {
        lines.push("Arguments:".to_string());
        for (key, value) in map {
            lines.push(format!(
                "  {key}: {}",
                elide(&display_value(value), MAX_VALUE_CHARS)
            ));
        }
        lines.push(String::new());
    }

    lines.push("Allowed Decisions:".to_string());
    for kind in &policy.allowed {
        lines.push(format!("  - {}", kind.label()));
    }
    lines.push(String::new());

    if let Some([what, check]) = guidance(&action.kind()) {
        lines.push(what.to_string());
        lines.push(check.to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_header_arguments_and_decisions() {
        let action = PendingAction::new(
            "get_documents",
            json!({"document_ids": ["doc_001", "doc_002"]}),
        );
        let rendered = render_action(&action, &ReviewPolicy::allow_all());

        assert!(rendered.starts_with(&"=".repeat(70)));
        assert!(rendered.contains("PENDING ACTION: get_documents"));
        assert!(rendered.contains("Arguments:"));
        assert!(rendered.contains("  document_ids: [\"doc_001\",\"doc_002\"]"));
        assert!(rendered.contains("Allowed Decisions:"));
        assert!(rendered.contains("  - approve"));
        assert!(rendered.contains("  - edit"));
        assert!(rendered.contains("  - reject"));
        assert!(rendered.contains("page-by-page summaries"));
    }

    #[test]
    fn long_values_are_elided_at_200_chars() {
        let long = "x".repeat(300);
        let action = PendingAction::new("write_file", json!({"content": long}));
        let rendered = render_action(&action, &ReviewPolicy::approve_or_reject());

        let expected = format!("  content: {}...", "x".repeat(200));
        assert!(rendered.contains(&expected));
        assert!(!rendered.contains(&"x".repeat(201)));
    }

    #[test]
    fn elide_respects_char_boundaries() {
        let multibyte = "€".repeat(250);
        let elided = elide(&multibyte, MAX_VALUE_CHARS);
        assert_eq!(elided.chars().count(), MAX_VALUE_CHARS + 3);
        assert!(elided.ends_with("..."));

        assert_eq!(elide("short", MAX_VALUE_CHARS), "short");
    }

    #[test]
    fn string_values_render_unquoted() {
        let action = PendingAction::new("web_fetch", json!({"url": "https://example.com"}));
        let rendered = render_action(&action, &ReviewPolicy::allow_all());
        assert!(rendered.contains("  url: https://example.com"));
        assert!(!rendered.contains("\"https://example.com\""));
    }

    #[test]
    fn empty_arguments_skip_the_section() {
        let action = PendingAction::new("list_documents", json!({}));
        let rendered = render_action(&action, &ReviewPolicy::allow_all());
        assert!(!rendered.contains("Arguments:"));
    }

    #[test]
    fn unknown_kind_gets_no_guidance() {
        let action = PendingAction::new("shell", json!({"command": "ls"}));
        let rendered = render_action(&action, &ReviewPolicy::approve_or_reject());
        assert!(rendered.contains("PENDING ACTION: shell"));
        assert!(!rendered.contains("This will"));
    }
}
