//! Error types for the pageclaw domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error enum; the orchestrator's taxonomy distinguishes
//! errors the caller can act on (configuration, transport, protocol,
//! context length) from tool failures, which are always converted into
//! tool-result data and fed back to the model instead of propagating.

use thiserror::Error;

/// The top-level error type for pageclaw operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the model endpoint.
#[derive(Debug, Clone, Error)]
pub enum EndpointError {
    /// No API key was supplied. Raised before any network call.
    #[error("No API credentials configured — set an API key before starting a conversation")]
    MissingCredentials,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited by the model service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The endpoint rejected the conversation as too large. Mapped to a
    /// user-actionable message: the fix is starting a new conversation.
    #[error("The conversation is too long for the model — start a new conversation")]
    ContextLength,

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    /// The service replied, but with something we cannot interpret.
    /// Distinct from transport failures so callers can tell "couldn't
    /// reach the service" from "service replied nonsensically".
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// A well-formed response with zero content items.
    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error reaching the model service: {0}")]
    Network(String),
}

/// Errors thrown by the tool execution gateway. Always recoverable from
/// the loop's point of view.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),

    #[error("request timed out")]
    Timeout,
}

impl GatewayError {
    /// Whether this error represents a gateway-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Errors terminating an orchestration call.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// The external abort signal fired. Partial text already streamed to
    /// the caller has been flushed before this is raised.
    #[error("The conversation was cancelled")]
    Cancelled,
}
