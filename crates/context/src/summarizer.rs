//! History compaction through a secondary model call.
//!
//! When the working conversation grows past a threshold, the oldest ~50%
//! of messages are replaced by a single synthetic assistant message
//! produced by a cheaper model. Summarization is strictly best-effort:
//! any failure of the secondary call degrades to "no compaction this
//! round" and the loop continues with the original messages.

use std::sync::Arc;

use pageclaw_core::{ContentPart, Message, ModelEndpoint, ModelRequest};
use tracing::{debug, warn};
use uuid::Uuid;

/// ID prefix tagging synthetic summary messages so they can be recognized
/// downstream. Summaries are otherwise ordinary assistant text and window
/// normally on later turns.
pub const SUMMARY_ID_PREFIX: &str = "summary-";

const SUMMARY_PROMPT: &str =
    "Summarize the conversation so far for your own future reference. \
     Preserve the user's goal, what has been done, and any important page \
     state. Keep it under 300 words.";

/// Compacts old conversation history through a secondary model endpoint.
pub struct Summarizer {
    endpoint: Arc<dyn ModelEndpoint>,
    model: String,
    max_output_tokens: u32,
    threshold: usize,
}

impl Summarizer {
    /// Create a summarizer over a (typically cheaper) secondary model.
    pub fn new(endpoint: Arc<dyn ModelEndpoint>, model: impl Into<String>, threshold: usize) -> Self {
        Self {
            endpoint,
            model: model.into(),
            max_output_tokens: 512,
            threshold,
        }
    }

    /// Whether `message` is a synthetic summary produced by a summarizer.
    pub fn is_summary(message: &Message) -> bool {
        message.id.starts_with(SUMMARY_ID_PREFIX)
    }

    /// Replace the oldest messages with one synthetic summary when the
    /// conversation exceeds the threshold. On any failure of the
    /// secondary call the input is returned unchanged.
    pub async fn compact(&self, messages: Vec<Message>) -> Vec<Message> {
        if messages.len() <= self.threshold {
            return messages;
        }

        // Keep the most recent half; never cut between an invocation and
        // its result.
        let mut cut = messages.len() / 2;
        if messages[cut].is_tool_result_reply() {
            cut -= 1;
        }
        if cut == 0 {
            return messages;
        }

        let summary_text = match self.request_summary(&messages[..cut]).await {
            Ok(text) => text,
            Err(reason) => {
                warn!(%reason, "summarization failed; keeping full history this round");
                return messages;
            }
        };

        debug!(
            compacted = cut,
            remaining = messages.len() - cut,
            "replaced old history with summary"
        );

        let summary = Message::assistant_with_id(
            format!("{SUMMARY_ID_PREFIX}{}", Uuid::new_v4()),
            format!("[Conversation summary] {summary_text}"),
        );

        let mut compacted = Vec::with_capacity(messages.len() - cut + 1);
        compacted.push(summary);
        compacted.extend(messages.into_iter().skip(cut));
        compacted
    }

    async fn request_summary(&self, old: &[Message]) -> std::result::Result<String, String> {
        let mut window = old.to_vec();
        window.push(Message::user(SUMMARY_PROMPT));

        let request = ModelRequest {
            model: self.model.clone(),
            max_output_tokens: self.max_output_tokens,
            tools: Vec::new(),
            messages: window,
            system_instructions: "You condense conversations into concise summaries.".into(),
        };

        let response = self
            .endpoint
            .complete(request)
            .await
            .map_err(|e| e.to_string())?;

        let text: String = response
            .content
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err("summary response contained no text".into());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pageclaw_core::{EndpointError, MessageContent, ModelResponse, StopReason};

    struct FixedEndpoint {
        reply: std::result::Result<String, EndpointError>,
    }

    #[async_trait]
    impl ModelEndpoint for FixedEndpoint {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn complete(&self, _req: ModelRequest) -> Result<ModelResponse, EndpointError> {
            match &self.reply {
                Ok(text) => Ok(ModelResponse {
                    content: vec![ContentPart::text(text.clone())],
                    stop_reason: StopReason::EndTurn,
                }),
                Err(e) => Err(e.clone()),
            }
        }
    }

    fn chat(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("user {i}"))
                } else {
                    Message::assistant(format!("assistant {i}"))
                }
            })
            .collect()
    }

    fn summarizer(reply: std::result::Result<String, EndpointError>) -> Summarizer {
        Summarizer::new(Arc::new(FixedEndpoint { reply }), "cheap-model", 8)
    }

    #[tokio::test]
    async fn below_threshold_is_a_noop() {
        let s = summarizer(Ok("irrelevant".into()));
        let input = chat(8);
        let output = s.compact(input.clone()).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn compacts_oldest_half_into_summary() {
        let s = summarizer(Ok("user asked about login; we clicked through".into()));
        let input = chat(12);
        let tail: Vec<String> = input[6..].iter().map(|m| m.id.clone()).collect();

        let output = s.compact(input).await;
        assert_eq!(output.len(), 7);
        assert!(Summarizer::is_summary(&output[0]));
        match &output[0].content {
            MessageContent::Text(text) => assert!(text.contains("login")),
            MessageContent::Parts(_) => panic!("summary must be plain text"),
        }
        let kept: Vec<String> = output[1..].iter().map(|m| m.id.clone()).collect();
        assert_eq!(kept, tail);
    }

    #[tokio::test]
    async fn cut_never_splits_a_pair() {
        // Arrange the midpoint to land on a tool-result reply.
        let mut input = chat(5);
        input.push(Message::assistant_parts(vec![ContentPart::tool_invocation(
            "inv-1",
            "browser_click",
            serde_json::json!({}),
        )]));
        input.push(Message::tool_results(vec![ContentPart::tool_result("inv-1", "ok")]));
        input.extend(chat(5));
        assert_eq!(input.len(), 12);
        assert!(input[6].is_tool_result_reply());

        let s = summarizer(Ok("summary".into()));
        let output = s.compact(input).await;
        // The cut backed off to keep the invocation with its result.
        assert!(output[1].has_tool_invocations());
        assert!(output[2].is_tool_result_reply());
    }

    #[tokio::test]
    async fn endpoint_failure_returns_input_unchanged() {
        let s = summarizer(Err(EndpointError::Network("unreachable".into())));
        let input = chat(12);
        let output = s.compact(input.clone()).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn empty_summary_text_returns_input_unchanged() {
        let s = summarizer(Ok("   ".into()));
        let input = chat(12);
        let output = s.compact(input.clone()).await;
        assert_eq!(output, input);
    }
}
