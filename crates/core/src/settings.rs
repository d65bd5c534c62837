//! Per-call orchestrator settings.
//!
//! The host supplies these with every orchestration call; there is no
//! config file at this layer. Every field has a default so hosts can
//! override only what they care about.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings recognized by the orchestration loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Primary model for the main loop.
    #[serde(default = "default_model")]
    pub model: String,

    /// Cheaper secondary model for summarization.
    #[serde(default = "default_summary_model")]
    pub summary_model: String,

    /// Output token ceiling per model call.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Messages kept when trimming the caller-supplied history before the
    /// first turn.
    #[serde(default = "default_history_window_size")]
    pub history_window_size: usize,

    /// Messages kept when trimming during the loop. Larger than the
    /// history limit because tool-result payloads inflate message size
    /// more than plain chat turns do.
    #[serde(default = "default_loop_window_size")]
    pub loop_window_size: usize,

    /// Whether to compact old history through the secondary model.
    #[serde(default)]
    pub enable_summarization: bool,

    /// Message count above which summarization kicks in.
    #[serde(default = "default_summary_threshold")]
    pub summary_threshold: usize,

    /// Maximum turns per orchestration call.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Ceiling on each model call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fixed delay between tool calls within one turn, in milliseconds.
    /// Gives the automated page time to settle between actions.
    #[serde(default = "default_tool_call_delay_ms")]
    pub tool_call_delay_ms: u64,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_summary_model() -> String {
    "claude-haiku-35-20241022".into()
}
fn default_max_output_tokens() -> u32 {
    4096
}
fn default_history_window_size() -> usize {
    20
}
fn default_loop_window_size() -> usize {
    40
}
fn default_summary_threshold() -> usize {
    8
}
fn default_max_turns() -> usize {
    25
}
fn default_request_timeout_secs() -> u64 {
    180
}
fn default_tool_call_delay_ms() -> u64 {
    300
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            summary_model: default_summary_model(),
            max_output_tokens: default_max_output_tokens(),
            history_window_size: default_history_window_size(),
            loop_window_size: default_loop_window_size(),
            enable_summarization: false,
            summary_threshold: default_summary_threshold(),
            max_turns: default_max_turns(),
            request_timeout_secs: default_request_timeout_secs(),
            tool_call_delay_ms: default_tool_call_delay_ms(),
        }
    }
}

impl OrchestratorSettings {
    /// The model-call ceiling as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The inter-tool-call delay as a `Duration`.
    pub fn tool_call_delay(&self) -> Duration {
        Duration::from_millis(self.tool_call_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = OrchestratorSettings::default();
        assert_eq!(s.history_window_size, 20);
        assert_eq!(s.loop_window_size, 40);
        assert!(s.loop_window_size > s.history_window_size);
        assert!(!s.enable_summarization);
        assert_eq!(s.summary_threshold, 8);
        assert_eq!(s.max_turns, 25);
        assert_eq!(s.request_timeout(), Duration::from_secs(180));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let s: OrchestratorSettings = serde_json::from_value(serde_json::json!({
            "history_window_size": 10,
            "enable_summarization": true
        }))
        .unwrap();
        assert_eq!(s.history_window_size, 10);
        assert!(s.enable_summarization);
        assert_eq!(s.loop_window_size, 40);
        assert_eq!(s.max_turns, 25);
    }
}
