//! Application initialization.
//!
//! Sets up process-wide resources for the command-line interface. The request
//! builder itself needs none of these.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
