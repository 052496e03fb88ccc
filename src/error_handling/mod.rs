//! Error handling and build statistics.
//!
//! This module provides:
//! - Error type definitions (resolution and request-construction failures)
//! - Build statistics tracking (successes and per-kind failures)
//!
//! Failures are categorized into:
//! - **Resolve**: the target's resolution capability returned an error
//! - **Malformed**: the assembled URL or the method failed validation

mod stats;
mod types;

// Re-export public API
pub use stats::BuildStats;
pub use types::{BuildError, FailureKind, InitializationError, ResolveError};
