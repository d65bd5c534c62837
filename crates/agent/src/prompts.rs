//! System instruction assembly.
//!
//! The policy block is plain prompt text. Its only functional content is
//! the tool-selection priority hint: integration (external) tools take
//! precedence over built-in browser actions when both could satisfy a
//! request. This is a best-effort instruction, deliberately not enforced
//! in code — the catalog ordering (external first) is the only structural
//! nudge.

use pageclaw_core::{ToolDefinition, ToolProvenance};

const BASE_INSTRUCTIONS: &str = "\
You are a browser automation assistant. You operate a real page on the \
user's behalf by calling the available tools. Work step by step: observe \
the page before acting, perform one action at a time, and verify the \
result before moving on. Report progress to the user in plain language.";

const PRIORITY_INSTRUCTION: &str = "\
When both an integration tool and a built-in browser tool could satisfy \
a request, prefer the integration tool.";

const COORDINATE_INSTRUCTION: &str = "\
Screenshots may be smaller than the page they show. Always apply the \
coordinate conversion factors included with a screenshot result before \
clicking a point you measured on the image.";

/// Build the system instructions for one orchestration call.
pub fn system_instructions(catalog: &[ToolDefinition]) -> String {
    let has_external = catalog
        .iter()
        .any(|t| t.provenance == ToolProvenance::External);
    let has_builtin = catalog
        .iter()
        .any(|t| t.provenance == ToolProvenance::Builtin);

    let mut sections = vec![BASE_INSTRUCTIONS];
    if has_external && has_builtin {
        sections.push(PRIORITY_INSTRUCTION);
    }
    if has_builtin {
        sections.push(COORDINATE_INSTRUCTION);
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageclaw_core::{builtin_tools, ToolDefinition};

    #[test]
    fn priority_hint_only_when_both_sets_present() {
        let external = vec![ToolDefinition::external(
            "crm_lookup",
            "look up a contact",
            serde_json::json!({"type": "object"}),
        )];

        let mut catalog = external.clone();
        catalog.extend(builtin_tools());
        assert!(system_instructions(&catalog).contains("prefer the integration tool"));

        assert!(!system_instructions(&external).contains("prefer the integration tool"));
        assert!(!system_instructions(&builtin_tools()).contains("prefer the integration tool"));
    }

    #[test]
    fn deterministic_for_identical_catalogs() {
        let catalog = builtin_tools();
        assert_eq!(system_instructions(&catalog), system_instructions(&catalog));
    }
}
