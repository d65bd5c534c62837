//! # pageclaw-core
//!
//! Domain types, traits, and error definitions for the pageclaw
//! conversation orchestrator. This crate has **zero framework
//! dependencies** — it defines the contracts that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the model endpoint and the tool
//! execution gateway — are defined as traits here. Implementations live in
//! their respective crates (`pageclaw-client` for HTTP; the gateway is the
//! host's). This keeps the orchestration loop testable with scripted
//! stand-ins and the dependency graph pointing inward.

pub mod catalog;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod message;
pub mod settings;

// Re-export key types at crate root for ergonomics
pub use catalog::{builtin_tools, compose_catalog, ToolDefinition, ToolProvenance, VISUAL_CAPTURE_TOOL};
pub use endpoint::{ModelEndpoint, ModelRequest, ModelResponse, StopReason};
pub use error::{EndpointError, Error, GatewayError, OrchestratorError, Result};
pub use gateway::{Capture, GatewayOutcome, ToolGateway};
pub use message::{invocations_answered, ContentPart, ImagePayload, Message, MessageContent, Role};
pub use settings::OrchestratorSettings;
