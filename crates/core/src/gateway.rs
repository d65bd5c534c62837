//! Tool execution gateway contract.
//!
//! The gateway is an external collaborator: it performs the real-world
//! effect of a tool call (clicks, typing, scrolling inside a page) and
//! returns an outcome. The orchestrator depends on this trait but never
//! implements it.
//!
//! A returned outcome may itself encode a logical failure (`error` set, or
//! `timeout` flagged) even when the call resolves cleanly, so callers must
//! inspect the outcome contents, not just the `Result`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::message::ImagePayload;

/// A captured frame plus the dimensions of the interactive surface it was
/// taken from. The surface can differ from the image in size, which is
/// what makes coordinate conversion necessary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// The encoded frame.
    pub image: ImagePayload,

    /// Width of the interactive surface, in logical pixels.
    pub surface_width: u32,

    /// Height of the interactive surface, in logical pixels.
    pub surface_height: u32,
}

/// The outcome of one gateway call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayOutcome {
    /// Human/model-readable result text.
    pub payload: String,

    /// A logical error message, when the tool ran but failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether the tool timed out inside the gateway.
    #[serde(default)]
    pub timeout: bool,

    /// Visual-capture result, present only for the reserved capture tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<Capture>,
}

impl GatewayOutcome {
    /// A plain successful outcome.
    pub fn ok(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// A logical-failure outcome.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A timed-out outcome.
    pub fn timed_out() -> Self {
        Self {
            error: Some("tool call timed out".into()),
            timeout: true,
            ..Self::default()
        }
    }
}

/// The external executor of tool calls.
///
/// Calls may take arbitrarily long; the orchestrator applies its own
/// timeout only to the model call and treats every gateway failure as a
/// recoverable per-tool error. Cancelling a call already in flight is the
/// gateway's own responsibility.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    async fn execute(
        &self,
        tool_name: &str,
        arguments: &serde_json::Value,
    ) -> Result<GatewayOutcome, GatewayError>;
}
