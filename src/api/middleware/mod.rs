//! HTTP middleware for request processing.
//!
//! - [`tracing`] - Request/response spans and latency logging
//! - [`cors`] - Cross-origin policy for browser clients

pub mod cors;
pub mod tracing;
