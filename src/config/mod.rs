//! Probe configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, well-known label keys)
//! - Header list splitting (Host override extraction)
//! - Label processors applied per target during request building
//! - Probe configuration and CLI option types

mod constants;
mod headers;
mod labels;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::{split_headers, SplitHeaders};
pub use labels::{AdditionalLabel, LabelProcessor};
pub use types::{LogFormat, LogLevel, ProbeConfig, ResolveFirst};
