//! Sliding-window trimming.
//!
//! Bounds the conversation to a maximum message count while keeping every
//! tool-invocation/tool-result pair intact. Two limits exist: a "history"
//! limit applied once to the caller-supplied history before the first
//! turn, and a larger "loop" limit re-applied after every turn (captured
//! frames inflate loop messages far beyond plain chat turns).
//!
//! # Determinism
//!
//! Trimming is a pure function of its inputs: identical conversations and
//! limits always produce identical windows.

use pageclaw_core::Message;
use tracing::warn;

/// Index at which the trimmed window starts.
///
/// Returns `0` (no trim) when the conversation already fits. Otherwise the
/// window is the last `max` messages, extended left by exactly one when
/// the cut would strand a tool-result reply from its invocation message.
/// The extension never grows past one message; a boundary still broken
/// after extending is logged as an anomaly rather than chased.
pub fn trim_start(messages: &[Message], max: usize) -> usize {
    if max == 0 || messages.len() <= max {
        return 0;
    }

    let mut start = messages.len() - max;
    if messages[start].is_tool_result_reply() {
        // The answer half of a pair sits on the boundary; keep the
        // question half too.
        start -= 1;
        if messages[start].is_tool_result_reply() {
            warn!(
                start,
                total = messages.len(),
                "window boundary still mid-pair after one-message extension"
            );
        }
    }
    start
}

/// The trimmed window as a slice of the original conversation.
pub fn trim(messages: &[Message], max: usize) -> &[Message] {
    &messages[trim_start(messages, max)..]
}

/// Trim a conversation buffer in place, dropping messages from the front.
pub fn trim_in_place(messages: &mut Vec<Message>, max: usize) {
    let start = trim_start(messages, max);
    if start > 0 {
        messages.drain(..start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageclaw_core::{invocations_answered, ContentPart, Message};

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

    fn pair(id: &str) -> (Message, Message) {
        (
            Message::assistant_parts(vec![ContentPart::tool_invocation(
                id,
                "browser_click",
                serde_json::json!({"x": 1, "y": 2}),
            )]),
            Message::tool_results(vec![ContentPart::tool_result(id, "clicked")]),
        )
    }

    #[test]
    fn noop_trim_returns_input_unchanged() {
        let conv = chat(6);
        let trimmed = trim(&conv, 10);
        assert_eq!(trimmed, conv.as_slice());

        let exact = trim(&conv, 6);
        assert_eq!(exact, conv.as_slice());
    }

    #[test]
    fn plain_chat_keeps_last_max() {
        let conv = chat(12);
        let trimmed = trim(&conv, 10);
        assert_eq!(trimmed.len(), 10);
        assert_eq!(trimmed[0].id, conv[2].id);
        assert_eq!(trimmed[9].id, conv[11].id);
    }

    #[test]
    fn boundary_pair_survives_by_extension() {
        // 9 chat messages, then an invocation/result pair: a size-10 cut
        // would land on the result and strand it.
        let mut conv = chat(9);
        let (ask, answer) = pair("inv-7");
        conv.push(ask);
        conv.push(answer);
        assert_eq!(conv.len(), 11);

        let trimmed = trim(&conv, 10);
        assert_eq!(trimmed.len(), 11);
        assert!(trimmed[trimmed.len() - 2].has_tool_invocations());
        assert!(invocations_answered(
            &trimmed[trimmed.len() - 2],
            &trimmed[trimmed.len() - 1]
        ));
    }

    #[test]
    fn pairing_invariant_holds_for_all_window_sizes() {
        let mut conv = chat(3);
        for i in 0..5 {
            let (ask, answer) = pair(&format!("inv-{i}"));
            conv.push(ask);
            conv.push(answer);
        }
        conv.push(Message::assistant("all done"));

        for max in 1..=conv.len() + 2 {
            let trimmed = trim(&conv, max);
            for w in trimmed.windows(2) {
                if w[0].has_tool_invocations() {
                    assert!(
                        invocations_answered(&w[0], &w[1]),
                        "orphaned invocation at max={max}"
                    );
                }
            }
            // No result may open the window.
            if let Some(first) = trimmed.first() {
                assert!(!first.is_tool_result_reply(), "orphaned result at max={max}");
            }
        }
    }

    #[test]
    fn extension_capped_at_one_message() {
        // Adjacent results (malformed input) must not grow the window
        // unboundedly.
        let (_, stray) = pair("inv-a");
        let (ask, answer) = pair("inv-b");
        let conv = vec![
            Message::user("start"),
            Message::assistant("ok"),
            stray,
            ask,
            answer,
        ];
        let trimmed = trim(&conv, 3);
        // Cut at 3 lands on `ask` (fine); cut at 2 would land on `answer`.
        assert!(trimmed.len() <= 4);
    }

    #[test]
    fn trim_in_place_drains_front() {
        let mut conv = chat(12);
        let tail_id = conv[11].id.clone();
        trim_in_place(&mut conv, 10);
        assert_eq!(conv.len(), 10);
        assert_eq!(conv[9].id, tail_id);
    }

    #[test]
    fn zero_max_is_a_noop() {
        let mut conv = chat(4);
        trim_in_place(&mut conv, 0);
        assert_eq!(conv.len(), 4);
    }
}
