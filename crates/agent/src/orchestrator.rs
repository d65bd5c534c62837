//! The turn-by-turn orchestration loop.
//!
//! One orchestration call owns one conversation window: trim the supplied
//! history, then repeat (send window + catalog to the model → emit text →
//! execute requested tools sequentially → append the invocation/result
//! pair → re-trim) until the model stops requesting tools or the turn
//! budget runs out.
//!
//! The window is the only mutable shared state and it is owned
//! exclusively by the loop; the window manager and summarizer are called
//! synchronously at loop-controlled points, never from a separate task.

use std::sync::Arc;

use pageclaw_core::{
    compose_catalog, ContentPart, EndpointError, GatewayOutcome, Message, ModelEndpoint,
    ModelRequest, OrchestratorError, OrchestratorSettings, ToolGateway,
};
use pageclaw_context::{window, Summarizer};
use tracing::{debug, info, warn};

use crate::hooks::RunOptions;
use crate::prompts;
use crate::scaling;

/// Literal control-syntax tokens that must never surface in natural
/// language output.
const CONTROL_TOKENS: &[&str] = &["<|im_start|>", "<|im_end|>", "<|tool_call|>", "<|endoftext|>"];

/// Why a run ended. Both variants are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The model stopped requesting tools.
    Done,
    /// The configured turn budget was exhausted.
    TurnBudget,
}

/// The result of one orchestration call.
#[derive(Debug)]
pub struct RunOutcome {
    /// The final conversation window, trimmed, with all messages the loop
    /// appended.
    pub transcript: Vec<Message>,
    /// Turns that executed tools.
    pub turns: usize,
    /// How the run ended.
    pub stop: StopCause,
}

/// Drives the agent loop against a model endpoint and a tool gateway.
pub struct Orchestrator {
    endpoint: Arc<dyn ModelEndpoint>,
    gateway: Arc<dyn ToolGateway>,
    settings: OrchestratorSettings,
    summarizer: Option<Summarizer>,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(
        endpoint: Arc<dyn ModelEndpoint>,
        gateway: Arc<dyn ToolGateway>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            endpoint,
            gateway,
            settings,
            summarizer: None,
        }
    }

    /// Attach a secondary endpoint for summarization. Takes effect only
    /// when `enable_summarization` is set.
    pub fn with_summary_endpoint(mut self, endpoint: Arc<dyn ModelEndpoint>) -> Self {
        if self.settings.enable_summarization {
            self.summarizer = Some(Summarizer::new(
                endpoint,
                self.settings.summary_model.clone(),
                self.settings.summary_threshold,
            ));
        }
        self
    }

    /// Run the loop over the caller-supplied history until a terminal
    /// state. Text streams through `opts.on_text` as it is recognized;
    /// anything already emitted stays emitted even when the call ends in
    /// an error.
    pub async fn run(
        &self,
        history: Vec<Message>,
        opts: RunOptions,
    ) -> Result<RunOutcome, OrchestratorError> {
        let mut conversation = history;
        window::trim_in_place(&mut conversation, self.settings.history_window_size);
        conversation = self.maybe_compact(conversation).await;

        // Recomputed per call from the caller's current settings, never
        // cached across calls.
        let catalog = compose_catalog(&opts.external_tools, opts.local_tools_enabled);
        let system_instructions = prompts::system_instructions(&catalog);

        info!(
            messages = conversation.len(),
            tools = catalog.len(),
            max_turns = self.settings.max_turns,
            "starting orchestration"
        );

        let mut turns = 0;
        loop {
            let request = ModelRequest {
                model: self.settings.model.clone(),
                max_output_tokens: self.settings.max_output_tokens,
                tools: catalog.clone(),
                messages: conversation.clone(),
                system_instructions: system_instructions.clone(),
            };

            // The abort signal is honored at the model-call boundary:
            // dropping the in-flight future aborts the HTTP request. A
            // gateway call already running is never cancelled from here.
            let response = tokio::select! {
                r = self.endpoint.complete(request) => r.map_err(OrchestratorError::Endpoint)?,
                _ = opts.cancel.cancelled() => {
                    info!(turns, "orchestration cancelled");
                    return Err(OrchestratorError::Cancelled);
                }
            };

            // The empty-content check belongs to the loop, not just the
            // HTTP client: any endpoint implementation may misbehave, and
            // a contentless response must never read as a completed turn.
            if response.content.is_empty() {
                return Err(OrchestratorError::Endpoint(EndpointError::EmptyResponse));
            }

            for part in &response.content {
                if let ContentPart::Text { text } = part {
                    let clean = sanitize_text(text);
                    if !clean.is_empty() {
                        opts.emit_text(&clean);
                    }
                }
            }

            let invocations: Vec<(String, String, serde_json::Value)> = response
                .content
                .iter()
                .filter_map(|p| match p {
                    ContentPart::ToolInvocation {
                        invocation_id,
                        tool_name,
                        arguments,
                    } => Some((invocation_id.clone(), tool_name.clone(), arguments.clone())),
                    _ => None,
                })
                .collect();

            if invocations.is_empty() {
                debug!(turns, "model ended its turn without tool calls");
                conversation.push(Message::assistant_parts(response.content));
                return Ok(RunOutcome {
                    transcript: conversation,
                    turns,
                    stop: StopCause::Done,
                });
            }

            info!(count = invocations.len(), "executing tool calls");

            // Strictly sequential, in emitted order: later calls depend
            // on side effects of earlier ones.
            let mut results: Vec<ContentPart> = Vec::with_capacity(invocations.len());
            for (i, (invocation_id, tool_name, arguments)) in invocations.iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(self.settings.tool_call_delay()).await;
                }
                opts.notify_tool_start(tool_name, arguments);
                let outcome = self.gateway.execute(tool_name, arguments).await;
                results.push(classify_outcome(invocation_id, tool_name, outcome));
            }

            // The only message-creation site: always one assistant
            // message and one user reply, an atomic pair.
            conversation.push(Message::assistant_parts(response.content));
            conversation.push(Message::tool_results(results));

            window::trim_in_place(&mut conversation, self.settings.loop_window_size);
            conversation = self.maybe_compact(conversation).await;

            turns += 1;
            if turns >= self.settings.max_turns {
                warn!(turns, "turn budget exhausted");
                opts.emit_text(
                    "\n\nReached the maximum number of turns for this request. \
                     Send another message to continue.",
                );
                return Ok(RunOutcome {
                    transcript: conversation,
                    turns,
                    stop: StopCause::TurnBudget,
                });
            }
        }
    }

    async fn maybe_compact(&self, conversation: Vec<Message>) -> Vec<Message> {
        match &self.summarizer {
            Some(s) => s.compact(conversation).await,
            None => conversation,
        }
    }
}

/// Strip literal control-syntax tokens from model text.
fn sanitize_text(text: &str) -> String {
    let mut clean = text.to_string();
    for token in CONTROL_TOKENS {
        if clean.contains(token) {
            clean = clean.replace(token, "");
        }
    }
    clean
}

/// Turn one gateway outcome into a tool-result part. Every failure mode
/// is recoverable: it becomes data the model consumes on the next turn.
fn classify_outcome(
    invocation_id: &str,
    tool_name: &str,
    outcome: Result<GatewayOutcome, pageclaw_core::GatewayError>,
) -> ContentPart {
    match outcome {
        Err(err) => {
            warn!(tool = tool_name, error = %err, "tool call threw");
            if err.is_timeout() || err.to_string().contains("timed out") {
                ContentPart::tool_timeout(invocation_id, format!("Error: {err}"))
            } else {
                ContentPart::tool_error(invocation_id, format!("Error: {err}"))
            }
        }
        Ok(outcome) => {
            if outcome.timeout {
                let detail = outcome.error.unwrap_or_else(|| "tool call timed out".into());
                return ContentPart::tool_timeout(invocation_id, detail);
            }
            if let Some(error) = outcome.error {
                warn!(tool = tool_name, %error, "tool reported a logical error");
                return ContentPart::tool_error(invocation_id, error);
            }
            match outcome.capture {
                Some(capture) => {
                    let mut payload = outcome.payload;
                    if !payload.is_empty() {
                        payload.push_str("\n\n");
                    }
                    payload.push_str(&scaling::conversion_instruction(&capture));
                    ContentPart::ToolResult {
                        invocation_id: invocation_id.into(),
                        payload,
                        is_error: false,
                        timeout: false,
                        image: Some(capture.image),
                    }
                }
                None => ContentPart::tool_result(invocation_id, outcome.payload),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageclaw_core::{Capture, GatewayError, ImagePayload};

    #[test]
    fn sanitize_strips_control_tokens() {
        assert_eq!(sanitize_text("hello<|im_end|>"), "hello");
        assert_eq!(
            sanitize_text("<|tool_call|>click<|endoftext|>"),
            "click"
        );
        assert_eq!(sanitize_text("plain text"), "plain text");
    }

    #[test]
    fn thrown_error_becomes_recoverable_result() {
        let part = classify_outcome("inv-1", "browser_click", Err(GatewayError::Execution("boom".into())));
        match part {
            ContentPart::ToolResult { is_error, timeout, payload, .. } => {
                assert!(is_error);
                assert!(!timeout);
                assert!(payload.contains("boom"));
            }
            _ => panic!("expected a tool result"),
        }
    }

    #[test]
    fn gateway_timeout_sets_both_flags() {
        let part = classify_outcome("inv-1", "browser_click", Err(GatewayError::Timeout));
        match part {
            ContentPart::ToolResult { is_error, timeout, .. } => {
                assert!(is_error);
                assert!(timeout);
            }
            _ => panic!("expected a tool result"),
        }
    }

    #[test]
    fn logical_error_in_successful_return_detected() {
        let part = classify_outcome(
            "inv-1",
            "browser_type",
            Ok(GatewayOutcome::failed("no focused element")),
        );
        match part {
            ContentPart::ToolResult { is_error, payload, .. } => {
                assert!(is_error);
                assert_eq!(payload, "no focused element");
            }
            _ => panic!("expected a tool result"),
        }
    }

    #[test]
    fn capture_result_carries_image_and_instruction() {
        let outcome = GatewayOutcome {
            payload: "captured the visible page".into(),
            error: None,
            timeout: false,
            capture: Some(Capture {
                image: ImagePayload::from_bytes("image/png", b"frame", 800, 600),
                surface_width: 1280,
                surface_height: 960,
            }),
        };
        let part = classify_outcome("inv-1", "browser_screenshot", Ok(outcome));
        match part {
            ContentPart::ToolResult { payload, image, is_error, .. } => {
                assert!(!is_error);
                assert!(payload.contains("captured the visible page"));
                assert!(payload.contains("multiply"));
                let image = image.expect("capture must attach the image");
                assert_eq!(image.width, 800);
            }
            _ => panic!("expected a tool result"),
        }
    }
}
