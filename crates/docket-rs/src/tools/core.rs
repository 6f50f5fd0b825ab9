//! Tool trait, dispatch, and execution plumbing.
//!
//! Every capability an analysis session can exercise is a [`Tool`]: a JSON
//! Schema definition plus an async `execute` that maps raw argument JSON to a
//! result string. [`ToolSet`] owns the registered tools and handles dispatch,
//! argument validation, timeouts, and result truncation. Tools that touch a
//! guarded boundary (quota draw-down, outbound fetches, filesystem writes)
//! report `requires_review() == true`; the set tracks those names so the
//! workflow knows which calls must suspend for a reviewer decision.

use crate::ToolDef;
use crate::research::{PageFetcher, SearchProvider};
use crate::retrieval::{QuotaGuard, RetrievalService};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Default maximum tool result size before truncation (30 KB).
pub const DEFAULT_MAX_RESULT_BYTES: usize = 30_000;

/// Boxed future returned by [`Tool::execute`]. Using a boxed future keeps the
/// trait dyn-compatible so tools can live in a `HashMap<String, Box<dyn Tool>>`.
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = String> + Send + 'a>>;

// ── Tool trait ─────────────────────────────────────────────────────

/// A capability the analysis session can invoke by name.
///
/// Implementors provide:
/// - A static definition ([`Tool::definition`]) describing the tool's name,
///   description, and JSON Schema parameters.
/// - An async [`Tool::execute`] method that receives the raw JSON arguments
///   string and returns a result string.
///
/// # Example
///
/// ```ignore
/// struct ListDocumentsTool { service: Arc<RetrievalService> }
///
/// impl Tool for ListDocumentsTool {
///     fn definition(&self) -> ToolDef { /* ... */ }
///
///     fn execute(&self, arguments: &str) -> ToolFuture<'_> {
///         let service = self.service.clone();
///         let arguments = arguments.to_string();
///         Box::pin(async move {
///             // parse args, read the index, format the listing
///             todo!()
///         })
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The tool definition exposed to callers and validators.
    fn definition(&self) -> ToolDef;

    /// Execute the tool with the given raw JSON arguments string.
    ///
    /// Returns the tool result as a string. Errors should be returned as
    /// `"Error: ..."` strings rather than panicking — the session records
    /// the string as the call's result either way.
    ///
    /// Uses a boxed future so that the trait is dyn-compatible (object-safe).
    fn execute(&self, arguments: &str) -> ToolFuture<'_>;

    /// The tool's name (convenience — delegates to definition).
    fn name(&self) -> String {
        self.definition().function.name
    }

    /// Whether calls to this tool must pause for a reviewer decision before
    /// executing. Defaults to `false`.
    fn requires_review(&self) -> bool {
        false
    }
}

// ── ToolSet ────────────────────────────────────────────────────────

/// Default timeout for tool execution (60 seconds).
pub const DEFAULT_TOOL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// A collection of tools that can be dispatched by name.
///
/// Manages tool registration, definition export, and dispatch with timing,
/// validation, and truncation. The set also tracks which registered tools
/// are review-required; the workflow consults that set to decide which calls
/// suspend the session.
///
/// # Example
///
/// ```ignore
/// let tools = ToolSet::new()
///     .with_corpus_tools(service.clone())
///     .with_research_tools(provider, fetcher, quota)
///     .with_arg_validation(true)
///     .with_default_timeout(Some(DEFAULT_TOOL_TIMEOUT));
///
/// assert!(tools.is_review_required("get_document_pages"));
/// ```
pub struct ToolSet {
    tools: HashMap<String, Box<dyn Tool>>,
    max_result_bytes: usize,
    /// Whether to validate tool arguments against JSON Schema before execution.
    validate_args: bool,
    /// Default timeout for tool execution. `None` disables timeouts.
    default_timeout: Option<std::time::Duration>,
    /// Tool names that pause for review (populated from `Tool::requires_review()`).
    review_required: HashSet<String>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("max_result_bytes", &self.max_result_bytes)
            .finish()
    }
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            validate_args: false,
            default_timeout: None,
            review_required: HashSet::new(),
        }
    }

    /// Set the maximum result size in bytes before truncation.
    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Enable JSON Schema argument validation before tool execution.
    pub fn with_arg_validation(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Set a default timeout for tool execution. Applies to all tools unless
    /// disabled. Pass `None` to disable timeouts.
    pub fn with_default_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name();
        if tool.requires_review() {
            self.review_required.insert(name.clone());
        }
        self.tools.insert(name, Box::new(tool));
    }

    /// Register a tool (builder pattern).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// Conditionally register a tool (builder pattern).
    ///
    /// Adds the tool only when `condition` is `true`. This keeps the
    /// builder chain intact for conditional tool registration instead of
    /// requiring mutable reassignment:
    ///
    /// ```ignore
    /// let tools = ToolSet::new()
    ///     .with(ListDocumentsTool::new(service))
    ///     .with_if(web_enabled, WebSearchTool::new(provider));
    /// ```
    pub fn with_if(self, condition: bool, tool: impl Tool + 'static) -> Self {
        if condition { self.with(tool) } else { self }
    }

    /// Mark additional tool names as review-required (builder pattern).
    ///
    /// Tools declare their own default via [`Tool::requires_review`]; this
    /// override lets a run widen the guarded set from configuration without
    /// touching the tool implementations.
    pub fn with_review_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.review_required.insert(name.into());
        }
        self
    }

    /// Return all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Register the three corpus tools (`list_documents`, `get_documents`,
    /// `get_document_pages`) backed by the given retrieval service.
    ///
    /// This is a convenience method for the typical session setup pattern.
    /// Use individual `.with()` calls if you need per-tool configuration.
    pub fn with_corpus_tools(self, service: Arc<RetrievalService>) -> Self {
        use crate::tools::corpus_tools::{GetDocumentPagesTool, GetDocumentsTool, ListDocumentsTool};
        self.with(ListDocumentsTool::new(service.clone()))
            .with(GetDocumentsTool::new(service.clone()))
            .with(GetDocumentPagesTool::new(service))
    }

    /// Register the two research tools (`web_search`, `web_fetch`).
    ///
    /// `web_fetch` draws down the session's fetch quota; `web_search` is
    /// unguarded.
    pub fn with_research_tools(
        self,
        provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        quota: Arc<QuotaGuard>,
    ) -> Self {
        use crate::tools::research_tools::{WebFetchTool, WebSearchTool};
        self.with(WebSearchTool::new(provider))
            .with(WebFetchTool::new(fetcher, quota))
    }

    /// Whether a tool call must pause for a reviewer decision.
    pub fn is_review_required(&self, tool_name: &str) -> bool {
        self.review_required.contains(tool_name)
    }

    /// All review-required tool names, sorted for deterministic policy maps.
    pub fn review_required_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.review_required.iter().cloned().collect();
        names.sort();
        names
    }

    /// Execute a tool call by name, with optional validation, timing, and truncation.
    ///
    /// If argument validation is enabled, validates arguments against the tool's
    /// declared JSON Schema before execution. Returns a structured error on
    /// validation failure so the caller can correct the arguments.
    ///
    /// Returns the (possibly truncated) result string.
    /// Returns an error string if the tool name is unknown.
    pub async fn execute(&self, name: &str, arguments: &str) -> String {
        let tool = match self.tools.get(name) {
            Some(t) => t,
            None => return format!("Error: unknown tool '{name}'"),
        };

        // Validate arguments against JSON Schema if enabled.
        if self.validate_args
            && let Some(error) = validate_tool_arguments(tool.as_ref(), arguments)
        {
            return error;
        }

        log_tool_call(name, arguments);
        let start = std::time::Instant::now();

        // Execute with optional timeout.
        let result = if let Some(timeout_duration) = self.default_timeout {
            match tokio::time::timeout(timeout_duration, tool.execute(arguments)).await {
                Ok(r) => r,
                Err(_) => {
                    let elapsed = start.elapsed();
                    info!(
                        "Tool {name} timed out after {:.1}s (limit: {:.0}s)",
                        elapsed.as_secs_f64(),
                        timeout_duration.as_secs_f64(),
                    );
                    format!(
                        "Error: tool '{name}' timed out after {:.0} seconds. \
                         Consider requesting fewer pages or smaller inputs.",
                        timeout_duration.as_secs_f64(),
                    )
                }
            }
        } else {
            tool.execute(arguments).await
        };

        let elapsed = start.elapsed();
        debug!(
            "Tool {name} completed in {:.0}ms ({} bytes)",
            elapsed.as_secs_f64() * 1000.0,
            result.len()
        );
        let preview: String = result.chars().take(300).collect();
        trace!("Tool {name} result preview: {preview}");

        truncate_result(result, self.max_result_bytes)
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── DisabledTool ───────────────────────────────────────────────────

/// A tool that always returns an error message when executed.
///
/// Use this to register a "disabled" variant of a tool that callers can
/// still see in the tool list (preserving the description and schema) but
/// that returns a static error message explaining why it's unavailable.
///
/// # Example
///
/// ```ignore
/// let tools = ToolSet::new()
///     .with_if(has_search_key, WebSearchTool::new(provider))
///     .with_if(!has_search_key, DisabledTool::from_tool(
///         &WebSearchTool::new(provider),
///         "Web search is unavailable. Set SEARCH_API_KEY to enable it.",
///     ));
/// ```
pub struct DisabledTool {
    def: ToolDef,
    reason: String,
}

impl DisabledTool {
    /// Create a disabled tool with the given definition and error reason.
    ///
    /// When executed, returns `"Error: {reason}"`.
    pub fn new(def: ToolDef, reason: impl Into<String>) -> Self {
        Self {
            def,
            reason: reason.into(),
        }
    }

    /// Create a disabled variant of an existing tool.
    ///
    /// Extracts the [`ToolDef`] from `tool` so callers see the same name,
    /// description, and schema, but execution always returns an error with
    /// the given reason.
    pub fn from_tool(tool: &dyn Tool, reason: impl Into<String>) -> Self {
        Self {
            def: tool.definition(),
            reason: reason.into(),
        }
    }
}

impl Tool for DisabledTool {
    fn definition(&self) -> ToolDef {
        self.def.clone()
    }

    fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
        let msg = format!("Error: {}", self.reason);
        Box::pin(async move { msg })
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Validate tool arguments against the tool's declared JSON Schema.
///
/// Returns `None` if valid, or `Some(error_string)` if validation fails.
/// The error string names the offending fields so the caller can correct
/// the arguments and retry.
pub fn validate_tool_arguments(tool: &dyn Tool, arguments: &str) -> Option<String> {
    let args_value: serde_json::Value = match serde_json::from_str(arguments) {
        Ok(v) => v,
        Err(e) => {
            return Some(format!(
                "Error: invalid JSON arguments for tool '{}': {e}. \
                 Please provide valid JSON matching the tool's parameter schema.",
                tool.name()
            ));
        }
    };

    let schema = tool.definition().function.parameters;

    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(_) => return None, // If schema itself is invalid, skip validation.
    };

    let errors: Vec<String> = validator
        .iter_errors(&args_value)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(format!(
            "Error: argument validation failed for tool '{}':\n{}\n\
             Please fix the arguments and try again.",
            tool.name(),
            errors.join("\n")
        ))
    }
}

/// Log a tool call at INFO level with a truncated preview of arguments.
pub fn log_tool_call(name: &str, arguments: &str) {
    let args_preview: String = arguments.chars().take(120).collect();
    info!(
        "[tool] {}({args_preview}{})",
        name,
        if args_preview.len() < arguments.len() {
            "..."
        } else {
            ""
        }
    );
    debug!("[tool] {name} full args ({} bytes)", arguments.len());
    trace!("[tool] {name} arguments: {arguments}");
}

/// Truncate a string to at most `max` bytes, appending a notice if trimmed.
///
/// The cut always lands on a char boundary, so multi-byte text never splits.
pub fn truncate_result(s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let total = s.len();
    let mut cut = max;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = s;
    out.truncate(cut);
    out.push_str(&format!("...\n[truncated: {total} bytes total]"));
    out
}

/// Parse raw JSON arguments into a typed struct.
///
/// Returns a formatted error string suitable for returning directly from
/// [`Tool::execute`] — the caller sees which part of the arguments failed
/// to parse.
///
/// # Example
///
/// ```ignore
/// fn execute(&self, arguments: &str) -> ToolFuture<'_> {
///     let arguments = arguments.to_string();
///     Box::pin(async move {
///         let args: MyArgs = match parse_tool_args(&arguments) {
///             Ok(a) => a,
///             Err(e) => return e,
///         };
///         // ... use args
///     })
/// }
/// ```
pub fn parse_tool_args<T: serde::de::DeserializeOwned>(arguments: &str) -> Result<T, String> {
    serde_json::from_str(arguments).map_err(|e| {
        format!(
            "Error: invalid tool arguments: {e}. \
             Please provide valid JSON matching the tool's parameter schema."
        )
    })
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new(
                "echo",
                "Echo the input",
                serde_json::json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            )
        }

        fn execute(&self, arguments: &str) -> ToolFuture<'_> {
            let args: serde_json::Value = serde_json::from_str(arguments).unwrap_or_default();
            let result = args
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("Error: no text")
                .to_string();
            Box::pin(async move { result })
        }
    }

    struct GatedTool;

    impl Tool for GatedTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new(
                "gated",
                "Draws down a session quota",
                serde_json::json!({"type": "object", "properties": {}}),
            )
        }

        fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
            Box::pin(async { "ok".into() })
        }

        fn requires_review(&self) -> bool {
            true
        }
    }

    #[test]
    fn tool_name_from_definition() {
        let tool = EchoTool;
        assert_eq!(tool.name(), "echo");
    }

    #[test]
    fn toolset_register_and_definitions() {
        let set = ToolSet::new().with(EchoTool).with(GatedTool);
        assert_eq!(set.len(), 2);

        let defs = set.definitions();
        let names: Vec<String> = defs.iter().map(|d| d.function.name.clone()).collect();
        assert!(names.contains(&"echo".to_string()));
        assert!(names.contains(&"gated".to_string()));
    }

    #[tokio::test]
    async fn toolset_execute_known_tool() {
        let set = ToolSet::new().with(EchoTool);
        let result = set.execute("echo", r#"{"text": "hello"}"#).await;
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn toolset_execute_unknown_tool() {
        let set = ToolSet::new().with(EchoTool);
        let result = set.execute("nonexistent", "{}").await;
        assert!(result.contains("unknown tool"));
    }

    #[tokio::test]
    async fn toolset_truncates_long_results() {
        struct BigTool;
        impl Tool for BigTool {
            fn definition(&self) -> ToolDef {
                ToolDef::new(
                    "big",
                    "Returns a big result",
                    serde_json::json!({"type": "object", "properties": {}}),
                )
            }
            fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
                Box::pin(async { "a".repeat(200) })
            }
        }

        let set = ToolSet::new().with_max_result_bytes(50).with(BigTool);
        let result = set.execute("big", "{}").await;
        assert!(result.contains("[truncated: 200 bytes total]"));
    }

    #[tokio::test]
    async fn toolset_times_out_slow_tool() {
        struct SlowTool;
        impl Tool for SlowTool {
            fn definition(&self) -> ToolDef {
                ToolDef::new(
                    "slow",
                    "Sleeps for a long time",
                    serde_json::json!({"type": "object", "properties": {}}),
                )
            }
            fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
                Box::pin(async {
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                    "done".into()
                })
            }
        }

        let set = ToolSet::new()
            .with_default_timeout(Some(std::time::Duration::from_millis(10)))
            .with(SlowTool);
        let result = set.execute("slow", "{}").await;
        assert!(result.contains("timed out"));
    }

    #[test]
    fn review_required_tracked_from_tool() {
        let set = ToolSet::new().with(EchoTool).with(GatedTool);
        assert!(set.is_review_required("gated"));
        assert!(!set.is_review_required("echo"));
    }

    #[test]
    fn with_review_required_widens_set() {
        let set = ToolSet::new()
            .with(EchoTool)
            .with_review_required(["echo"]);
        assert!(set.is_review_required("echo"));
    }

    #[test]
    fn review_required_tools_sorted() {
        let set = ToolSet::new()
            .with(GatedTool)
            .with_review_required(["zeta", "alpha"]);
        assert_eq!(set.review_required_tools(), vec!["alpha", "gated", "zeta"]);
    }

    #[test]
    fn with_if_true_registers_tool() {
        let set = ToolSet::new().with_if(true, EchoTool);
        assert_eq!(set.len(), 1);
        assert!(set.definitions().iter().any(|d| d.function.name == "echo"));
    }

    #[test]
    fn with_if_false_skips_tool() {
        let set = ToolSet::new().with_if(false, EchoTool);
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn validation_rejects_missing_required_field() {
        let set = ToolSet::new().with_arg_validation(true).with(EchoTool);
        let result = set.execute("echo", "{}").await;
        assert!(result.contains("argument validation failed"));
    }

    #[tokio::test]
    async fn validation_rejects_malformed_json() {
        let set = ToolSet::new().with_arg_validation(true).with(EchoTool);
        let result = set.execute("echo", "not json").await;
        assert!(result.contains("invalid JSON arguments"));
    }

    #[tokio::test]
    async fn validation_passes_good_arguments() {
        let set = ToolSet::new().with_arg_validation(true).with(EchoTool);
        let result = set.execute("echo", r#"{"text": "hello"}"#).await;
        assert_eq!(result, "hello");
    }

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate_result("hello".into(), 100), "hello");
    }

    #[test]
    fn truncate_long_is_cut() {
        let s = "a".repeat(200);
        let result = truncate_result(s, 50);
        assert!(result.starts_with(&"a".repeat(50)));
        assert!(result.contains("[truncated: 200 bytes total]"));
    }

    #[test]
    fn truncate_lands_on_char_boundary() {
        // Two-byte chars; an odd cut point must back up instead of panicking.
        let s = "é".repeat(40);
        let result = truncate_result(s, 25);
        assert!(result.starts_with(&"é".repeat(12)));
        assert!(result.contains("[truncated: 80 bytes total]"));
    }

    #[test]
    fn parse_tool_args_typed() {
        #[derive(serde::Deserialize)]
        struct Args {
            document_id: String,
        }
        let args: Args = parse_tool_args(r#"{"document_id": "doc_001"}"#)
            .expect("valid arguments should parse");
        assert_eq!(args.document_id, "doc_001");
    }

    #[test]
    fn parse_tool_args_error_is_formatted() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            #[allow(dead_code)]
            document_id: String,
        }
        let err = parse_tool_args::<Args>("{}").unwrap_err();
        assert!(err.starts_with("Error: invalid tool arguments"));
    }

    #[tokio::test]
    async fn disabled_tool_returns_error() {
        let def = ToolDef::new(
            "my_tool",
            "A tool that is disabled",
            serde_json::json!({"type": "object", "properties": {}}),
        );
        let tool = DisabledTool::new(def, "Feature not enabled. Pass --enable to turn on.");

        assert_eq!(tool.definition().function.name, "my_tool");
        let result = tool.execute("{}").await;
        assert_eq!(
            result,
            "Error: Feature not enabled. Pass --enable to turn on."
        );
    }

    #[tokio::test]
    async fn disabled_tool_from_tool_preserves_definition() {
        let original = EchoTool;
        let disabled = DisabledTool::from_tool(&original, "Feature gated off");

        assert_eq!(
            disabled.definition().function.name,
            original.definition().function.name
        );
        assert_eq!(
            disabled.definition().function.description,
            original.definition().function.description
        );

        let result = disabled.execute(r#"{"text": "hello"}"#).await;
        assert_eq!(result, "Error: Feature gated off");
    }
}
