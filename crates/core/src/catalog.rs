//! Tool definitions and catalog composition.
//!
//! The catalog sent to the model on every turn concatenates an externally
//! discovered tool set ahead of the built-in browser action set. Name
//! collisions resolve first-seen-wins, so an external tool shadows a
//! built-in of the same name. Composition is recomputed per orchestration
//! call from the caller's current settings and is fully deterministic.

use serde::{Deserialize, Serialize};

/// The tool name reserved for visual capture. When this tool succeeds the
/// gateway result carries an image of the page plus surface dimensions,
/// and the orchestrator appends a coordinate-conversion instruction.
pub const VISUAL_CAPTURE_TOOL: &str = "browser_screenshot";

/// Where a tool definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolProvenance {
    /// Discovered from an external integration at call time.
    External,
    /// Built-in native browser action.
    Builtin,
}

impl Default for ToolProvenance {
    // Definitions parsed off the wire are discovery results.
    fn default() -> Self {
        Self::External
    }
}

/// A tool definition sent to the model so it knows what it can call.
///
/// `input_schema` is a declarative JSON Schema understood by the endpoint,
/// never executed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name.
    pub name: String,

    /// Description of what the tool does.
    pub description: String,

    /// JSON Schema describing the tool's parameters.
    pub input_schema: serde_json::Value,

    /// Provenance tag. Not part of the wire contract.
    #[serde(skip)]
    pub provenance: ToolProvenance,
}

impl ToolDefinition {
    /// An externally discovered tool.
    pub fn external(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            provenance: ToolProvenance::External,
        }
    }

    fn builtin(
        name: &str,
        description: &str,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            provenance: ToolProvenance::Builtin,
        }
    }
}

/// The built-in browser action tool set.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::builtin(
            "browser_click",
            "Click at a point on the page, in page coordinates.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "x": { "type": "number", "description": "Horizontal page coordinate" },
                    "y": { "type": "number", "description": "Vertical page coordinate" }
                },
                "required": ["x", "y"]
            }),
        ),
        ToolDefinition::builtin(
            "browser_type",
            "Type text into the currently focused element.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "The text to type" }
                },
                "required": ["text"]
            }),
        ),
        ToolDefinition::builtin(
            "browser_scroll",
            "Scroll the page vertically by a pixel delta.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "dy": { "type": "number", "description": "Pixels to scroll; negative scrolls up" }
                },
                "required": ["dy"]
            }),
        ),
        ToolDefinition::builtin(
            "browser_navigate",
            "Navigate the current tab to a URL.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Absolute URL to load" }
                },
                "required": ["url"]
            }),
        ),
        ToolDefinition::builtin(
            VISUAL_CAPTURE_TOOL,
            "Capture a screenshot of the visible page. The result includes the \
             image and instructions for converting image coordinates to page \
             coordinates.",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ),
        ToolDefinition::builtin(
            "browser_read_page",
            "Read the text content and interactive elements of the current page.",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ),
    ]
}

/// Compose the catalog for one orchestration call: external tools first,
/// then the built-in set when enabled. Definitions with an empty name are
/// silently excluded (partial discovery upstream must not break the call);
/// duplicates resolve first-seen-wins. Never fails.
pub fn compose_catalog(external: &[ToolDefinition], local_enabled: bool) -> Vec<ToolDefinition> {
    let mut catalog: Vec<ToolDefinition> = Vec::new();

    let mut push_unique = |def: ToolDefinition, catalog: &mut Vec<ToolDefinition>| {
        if def.name.is_empty() {
            return;
        }
        if catalog.iter().any(|t| t.name == def.name) {
            return;
        }
        catalog.push(def);
    };

    for def in external {
        push_unique(def.clone(), &mut catalog);
    }
    if local_enabled {
        for def in builtin_tools() {
            push_unique(def, &mut catalog);
        }
    }

    catalog
}
