//! HTTP client for the pageclaw model endpoint contract.
//!
//! Implements `pageclaw_core::ModelEndpoint` over reqwest. The same
//! client type serves both the primary loop model and the cheaper
//! summarization model; the model choice travels in the request.

pub mod http;

pub use http::HttpEndpoint;
