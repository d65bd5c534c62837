//! # pageclaw-agent
//!
//! The conversation orchestration loop — the heart of pageclaw.
//!
//! One call to [`Orchestrator::run`] drives a full agent interaction:
//!
//! 1. **Trim** the caller-supplied history to the history window
//! 2. **Send** the window plus the composed tool catalog to the model
//! 3. **Emit** text to the caller as it is recognized
//! 4. **If tool calls**: execute them sequentially through the gateway,
//!    append the invocation/result pair, re-trim, loop back to step 2
//! 5. **If text only**: done
//!
//! The loop ends when the model stops requesting tools or the turn
//! budget is exhausted; fatal endpoint errors propagate to the caller
//! after any partial text has been flushed.

pub mod hooks;
pub mod orchestrator;
pub mod prompts;
pub mod scaling;

pub use hooks::{RunOptions, TextHandler, ToolStartHandler};
pub use orchestrator::{Orchestrator, RunOutcome, StopCause};
pub use scaling::ScaleFactors;
