//! Caller-facing hooks and per-call options.

use std::sync::Arc;

use pageclaw_core::ToolDefinition;
use tokio_util::sync::CancellationToken;

/// Receives sanitized text chunks as the model produces them.
pub type TextHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Observes each tool call just before it is dispatched to the gateway.
pub type ToolStartHandler = Arc<dyn Fn(&str, &serde_json::Value) + Send + Sync>;

/// Per-call options for one orchestration run.
#[derive(Clone)]
pub struct RunOptions {
    /// Externally discovered tools, composed ahead of the built-in set.
    pub external_tools: Vec<ToolDefinition>,

    /// Whether the built-in browser action set is offered at all.
    pub local_tools_enabled: bool,

    /// External abort signal, checked at the model-call boundary.
    pub cancel: CancellationToken,

    /// Streaming text callback.
    pub on_text: Option<TextHandler>,

    /// Tool-starting observer.
    pub on_tool_start: Option<ToolStartHandler>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            external_tools: Vec::new(),
            local_tools_enabled: true,
            cancel: CancellationToken::new(),
            on_text: None,
            on_tool_start: None,
        }
    }
}

impl RunOptions {
    /// Emit a text chunk to the caller, if a handler is attached.
    pub(crate) fn emit_text(&self, text: &str) {
        if let Some(handler) = &self.on_text {
            handler(text);
        }
    }

    /// Notify the tool-starting observer, if attached.
    pub(crate) fn notify_tool_start(&self, name: &str, arguments: &serde_json::Value) {
        if let Some(handler) = &self.on_tool_start {
            handler(name, arguments);
        }
    }
}
