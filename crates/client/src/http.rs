//! HTTP implementation of the model endpoint contract.
//!
//! Sends the request body exactly as the wire contract defines it:
//! `{ model, max_output_tokens, tools, messages, system_instructions }`,
//! and expects `{ content, stop_reason }` back. Status codes and body
//! shapes are mapped onto the typed error taxonomy so callers can tell
//! "couldn't reach the service" from "service replied nonsensically".

use async_trait::async_trait;
use pageclaw_core::{
    ContentPart, EndpointError, Message, MessageContent, ModelEndpoint, ModelRequest,
    ModelResponse, Role, StopReason, ToolDefinition,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/agent";
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// A model endpoint reached over HTTPS with api-key header auth.
pub struct HttpEndpoint {
    name: String,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpEndpoint {
    /// Create a new endpoint. Fails before any network call when the API
    /// key is missing.
    pub fn new(api_key: impl Into<String>) -> Result<Self, EndpointError> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new endpoint with an explicit per-request ceiling.
    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EndpointError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(EndpointError::MissingCredentials);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EndpointError::Network(e.to_string()))?;

        Ok(Self {
            name: "http".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key,
            timeout_secs: timeout.as_secs(),
            client,
        })
    }

    /// Use a custom base URL (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether an error body points at the input being too large.
    fn is_context_length_error(body: &str) -> bool {
        let lower = body.to_ascii_lowercase();
        lower.contains("context_length")
            || lower.contains("context window")
            || lower.contains("prompt is too long")
    }

    fn decode(body: WireResponse) -> Result<ModelResponse, EndpointError> {
        if body.content.is_empty() {
            // A well-formed reply with nothing in it means the service
            // produced no answer; treating it as success would leave the
            // loop believing it responded when it did not.
            return Err(EndpointError::EmptyResponse);
        }
        Ok(ModelResponse {
            content: body.content,
            stop_reason: body.stop_reason.unwrap_or(StopReason::EndTurn),
        })
    }
}

/// The outbound body, exactly as the service defines it. Borrowed views
/// over the domain request keep fields the contract does not name (such
/// as `Message::created_at`) off the wire, and `tools` is always present,
/// even when empty.
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    tools: &'a [ToolDefinition],
    messages: Vec<WireMessage<'a>>,
    system_instructions: &'a str,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    id: &'a str,
    role: Role,
    content: &'a MessageContent,
}

impl<'a> WireRequest<'a> {
    fn encode(request: &'a ModelRequest) -> Self {
        Self {
            model: &request.model,
            max_output_tokens: request.max_output_tokens,
            tools: &request.tools,
            messages: request.messages.iter().map(WireMessage::encode).collect(),
            system_instructions: &request.system_instructions,
        }
    }
}

impl<'a> WireMessage<'a> {
    fn encode(message: &'a Message) -> Self {
        Self {
            id: &message.id,
            role: message.role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    content: Vec<ContentPart>,
    #[serde(default)]
    stop_reason: Option<StopReason>,
}

#[async_trait]
impl ModelEndpoint for HttpEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, EndpointError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "sending model request"
        );

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&WireRequest::encode(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EndpointError::Timeout(self.timeout_secs)
                } else {
                    EndpointError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(EndpointError::Auth("invalid API key".into()));
        }
        if status == 429 {
            return Err(EndpointError::RateLimited { retry_after_secs: 5 });
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            if Self::is_context_length_error(&body) {
                return Err(EndpointError::ContextLength);
            }
            warn!(status, body = %body, "model API error");
            return Err(EndpointError::Api {
                status_code: status,
                message: body,
            });
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| EndpointError::MalformedResponse(e.to_string()))?;

        Self::decode(body)
    }
}
