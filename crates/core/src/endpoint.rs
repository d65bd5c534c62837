//! Model endpoint contract.
//!
//! A `ModelEndpoint` knows how to send one bounded conversation plus a tool
//! catalog to a tool-using model and return its content. The HTTP
//! implementation lives in `pageclaw-client`; the orchestrator and the
//! summarizer only ever see this trait, which keeps both testable with
//! scripted endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::ToolDefinition;
use crate::error::EndpointError;
use crate::message::{ContentPart, Message};

/// One outbound request. This shape is part of the wire contract and must
/// be honored field-for-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The model to use.
    pub model: String,

    /// Maximum tokens the model may generate.
    pub max_output_tokens: u32,

    /// The tool catalog for this turn. Always on the wire, even empty.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,

    /// The conversation window.
    pub messages: Vec<Message>,

    /// Policy and behavior instructions, sent as a top-level field.
    pub system_instructions: String,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of the response.
    EndTurn,
    /// The model wants tool results before continuing.
    ToolUse,
    /// Output token ceiling reached.
    MaxTokens,
    /// Anything else the endpoint reports.
    #[serde(untagged)]
    Other(String),
}

/// One model response: a non-empty list of content parts plus a stop
/// reason. An empty `content` list is a protocol violation and is rejected
/// by the endpoint implementation, never surfaced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: Vec<ContentPart>,
    pub stop_reason: StopReason,
}

impl ModelResponse {
    /// The tool invocations in this response, in emitted order.
    pub fn tool_invocations(&self) -> Vec<&ContentPart> {
        self.content
            .iter()
            .filter(|p| matches!(p, ContentPart::ToolInvocation { .. }))
            .collect()
    }
}

/// The abstraction over the remote model service.
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    /// A human-readable name for this endpoint.
    fn name(&self) -> &str;

    /// Send a request and get the complete response.
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, EndpointError>;
}
