//! Core abstractions for the step image parser.
//!
//! This crate provides the fundamental types shared by the expander and the
//! asset cache worker:
//! - `StepConfig` / `StepConfigOverrides` - Tag expander configuration
//! - `WorkerConfig` - Cache version, manifest and offline notice
//! - `InitGuard` - One-time initialization flag
//! - `ExpanderPhase` / `WorkerState` - Lifecycle tracking
//! - `RequestId` - Correlation identifier for logs

mod config;
mod context;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
