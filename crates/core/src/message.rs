//! Message domain types.
//!
//! A conversation is an ordered sequence of messages; each message carries
//! either plain text or a list of content parts (text, tool invocations,
//! tool results). Messages are transient — they live in the in-memory
//! conversation buffer for the duration of one orchestration call.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message. The model endpoint only ever sees these two
/// roles; system instructions travel as a top-level request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (including tool-result replies sent on their behalf).
    User,
    /// The model.
    Assistant,
}

/// A binary-encoded visual payload captured by the visual-capture tool.
///
/// Carries its pixel dimensions so coordinates the model reads off the
/// image can be scaled back into the surface's coordinate space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// MIME type of the encoded image (e.g. "image/png").
    pub media_type: String,

    /// Base64-encoded image bytes.
    pub data: String,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,
}

impl ImagePayload {
    /// Encode raw image bytes into a payload.
    pub fn from_bytes(
        media_type: impl Into<String>,
        bytes: &[u8],
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            width,
            height,
        }
    }
}

/// One segment of a message's content.
///
/// The image payload of a visual capture rides inside the tool result it
/// answers, so a tool-result reply message never contains anything but
/// `ToolResult` parts (see the pairing invariant on the window manager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// A plain text segment.
    Text { text: String },

    /// A model-requested tool call. Assistant messages only.
    ToolInvocation {
        invocation_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },

    /// The outcome of a tool call. User messages only; answers an
    /// invocation from the immediately preceding assistant message.
    ToolResult {
        invocation_id: String,
        payload: String,
        is_error: bool,
        /// Set when the failure was a gateway-side timeout, so the model
        /// can distinguish "slow" from "broken".
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        timeout: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImagePayload>,
    },
}

impl ContentPart {
    /// Construct a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Construct a tool-invocation part.
    pub fn tool_invocation(
        invocation_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolInvocation {
            invocation_id: invocation_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Construct a successful tool-result part.
    pub fn tool_result(invocation_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::ToolResult {
            invocation_id: invocation_id.into(),
            payload: payload.into(),
            is_error: false,
            timeout: false,
            image: None,
        }
    }

    /// Construct an error tool-result part.
    pub fn tool_error(invocation_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::ToolResult {
            invocation_id: invocation_id.into(),
            payload: payload.into(),
            is_error: true,
            timeout: false,
            image: None,
        }
    }

    /// Construct a timed-out tool-result part.
    pub fn tool_timeout(invocation_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::ToolResult {
            invocation_id: invocation_id.into(),
            payload: payload.into(),
            is_error: true,
            timeout: true,
            image: None,
        }
    }
}

/// Message content: plain text or an ordered sequence of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID.
    pub id: String,

    /// Who sent this message.
    pub role: Role,

    /// The content.
    pub content: MessageContent,

    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user text message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: MessageContent::Text(content.into()),
            created_at: Utc::now(),
        }
    }

    /// Create a new assistant text message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
            created_at: Utc::now(),
        }
    }

    /// Create an assistant message from raw content parts (text and tool
    /// invocations, exactly as the model emitted them).
    pub fn assistant_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: MessageContent::Parts(parts),
            created_at: Utc::now(),
        }
    }

    /// Create the user reply carrying tool results for the preceding
    /// assistant message's invocations.
    pub fn tool_results(parts: Vec<ContentPart>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: MessageContent::Parts(parts),
            created_at: Utc::now(),
        }
    }

    /// Create an assistant text message with a caller-chosen ID. Summary
    /// messages use a recognizable ID prefix so tests can spot them.
    pub fn assistant_with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
            created_at: Utc::now(),
        }
    }

    /// IDs of the tool invocations this message carries, in emitted order.
    pub fn invocation_ids(&self) -> Vec<&str> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::ToolInvocation { invocation_id, .. } => {
                        Some(invocation_id.as_str())
                    }
                    _ => None,
                })
                .collect(),
        }
    }

    /// Whether this message requests any tool calls.
    pub fn has_tool_invocations(&self) -> bool {
        !self.invocation_ids().is_empty()
    }

    /// Whether this is a user message whose content consists entirely of
    /// tool results — the "answer half" of an invocation/result pair.
    pub fn is_tool_result_reply(&self) -> bool {
        if self.role != Role::User {
            return false;
        }
        match &self.content {
            MessageContent::Text(_) => false,
            MessageContent::Parts(parts) => {
                !parts.is_empty()
                    && parts
                        .iter()
                        .all(|p| matches!(p, ContentPart::ToolResult { .. }))
            }
        }
    }

    /// IDs answered by the tool-result parts of this message.
    pub fn result_ids(&self) -> Vec<&str> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::ToolResult { invocation_id, .. } => Some(invocation_id.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Check whether every tool invocation in `prev` is answered by exactly one
/// tool result in `next`, and `next` carries nothing else.
///
/// The message model only checks structure; keeping pairs intact across
/// trimming is the window manager's job.
pub fn invocations_answered(prev: &Message, next: &Message) -> bool {
    let invocation_ids = prev.invocation_ids();
    if invocation_ids.is_empty() {
        return !next.is_tool_result_reply();
    }
    if !next.is_tool_result_reply() {
        return false;
    }
    let result_ids = next.result_ids();
    invocation_ids.len() == result_ids.len()
        && invocation_ids
            .iter()
            .all(|id| result_ids.iter().filter(|r| *r == id).count() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Click the login button");
        assert_eq!(msg.role, Role::User);
        assert!(!msg.has_tool_invocations());
        assert!(!msg.is_tool_result_reply());
    }

    #[test]
    fn assistant_parts_carry_invocations() {
        let msg = Message::assistant_parts(vec![
            ContentPart::text("Clicking now."),
            ContentPart::tool_invocation("inv-1", "browser_click", serde_json::json!({"x": 10})),
        ]);
        assert!(msg.has_tool_invocations());
        assert_eq!(msg.invocation_ids(), vec!["inv-1"]);
    }

    #[test]
    fn tool_result_reply_detection() {
        let reply = Message::tool_results(vec![ContentPart::tool_result("inv-1", "clicked")]);
        assert!(reply.is_tool_result_reply());

        let mixed = Message::tool_results(vec![
            ContentPart::tool_result("inv-1", "clicked"),
            ContentPart::text("extra"),
        ]);
        assert!(!mixed.is_tool_result_reply());

        let plain = Message::user("hello");
        assert!(!plain.is_tool_result_reply());
    }

    #[test]
    fn pairing_check() {
        let ask = Message::assistant_parts(vec![
            ContentPart::tool_invocation("inv-1", "browser_click", serde_json::json!({})),
            ContentPart::tool_invocation("inv-2", "browser_type", serde_json::json!({})),
        ]);
        let answer = Message::tool_results(vec![
            ContentPart::tool_result("inv-1", "ok"),
            ContentPart::tool_result("inv-2", "ok"),
        ]);
        assert!(invocations_answered(&ask, &answer));

        let partial = Message::tool_results(vec![ContentPart::tool_result("inv-1", "ok")]);
        assert!(!invocations_answered(&ask, &partial));

        let plain = Message::assistant("no tools here");
        assert!(invocations_answered(&plain, &Message::user("ok")));
    }

    #[test]
    fn content_part_wire_tags() {
        let part =
            ContentPart::tool_invocation("inv-9", "browser_scroll", serde_json::json!({"dy": 100}));
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains(r#""type":"tool_invocation""#));
        assert!(json.contains(r#""invocation_id":"inv-9""#));

        let result = ContentPart::tool_error("inv-9", "element not found");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""is_error":true"#));
        assert!(!json.contains("timeout"));
        assert!(!json.contains("image"));

        let timed = ContentPart::tool_timeout("inv-9", "request timed out");
        let json = serde_json::to_string(&timed).unwrap();
        assert!(json.contains(r#""timeout":true"#));
    }

    #[test]
    fn image_payload_encodes_base64() {
        let img = ImagePayload::from_bytes("image/png", b"\x89PNG", 800, 600);
        assert_eq!(img.width, 800);
        assert_eq!(img.height, 600);
        assert_eq!(img.data, "iVBORw==");
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::tool_results(vec![ContentPart::ToolResult {
            invocation_id: "inv-1".into(),
            payload: "done".into(),
            is_error: false,
            timeout: false,
            image: Some(ImagePayload::from_bytes("image/png", b"abc", 4, 4)),
        }]);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
