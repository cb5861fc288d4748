//! Observability infrastructure for the step image parser.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with correlation IDs
//! - `LogBuilder` - Fluent construction of entries with typed fields
//! - `LogSink` - Output to `tracing`, stderr, or an in-memory buffer

mod logging;

pub use logging::*;

// Re-export RequestId from step-core for convenience
pub use step_core::RequestId;
