//! Conversation context management for pageclaw.
//!
//! Two cooperating pieces keep the conversation bounded:
//!
//! 1. **Window manager** — hard cap on message count, applied once to the
//!    caller-supplied history and again after every turn, never splitting
//!    a tool-invocation/tool-result pair.
//! 2. **Summarizer** — optional, best-effort compaction of old history
//!    into one synthetic message via a secondary model call.
//!
//! Both are called synchronously at loop-controlled points; neither owns
//! a task of its own.

pub mod summarizer;
pub mod window;

pub use summarizer::{Summarizer, SUMMARY_ID_PREFIX};
pub use window::{trim, trim_in_place, trim_start};
