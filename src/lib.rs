//! probe_request library: HTTP request synthesis for probing agents
//!
//! This library builds, per monitored target, a fully specified HTTP request
//! that reflects the target's addressing, the probe's resolution mode,
//! label-derived overrides, and a reusable request body. It performs no
//! network I/O beyond the optional target resolution.
//!
//! # Example
//!
//! ```no_run
//! use probe_request::{build_request, ProbeConfig, Target, TargetSetContext};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeConfig::default()
//!     .with_protocol("https")
//!     .with_port(8443);
//! let mut target = Target::new("a.com").with_label("fqdn", "a.example.com");
//!
//! let request = build_request(&mut target, &config, &TargetSetContext::default()).await?;
//! assert_eq!(request.url, "https://a.example.com:8443");
//! assert_eq!(request.host_header, "a.example.com:8443");
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Resolution is async; call the builder from within a Tokio runtime.

pub mod batch;
pub mod config;
mod error_handling;
pub mod initialization;
pub mod request;
pub mod resolver;
pub mod target;

// Re-export public API
pub use batch::{build_requests, build_requests_with_failures, BatchOutcome};
pub use config::{
    AdditionalLabel, LabelProcessor, LogFormat, LogLevel, ProbeConfig, ResolveFirst, SplitHeaders,
};
pub use error_handling::{BuildError, BuildStats, FailureKind, InitializationError, ResolveError};
pub use request::{build_request, BodyRead, ProbeRequest, RequestBody};
pub use resolver::{DefaultResolver, Resolve, ResolveRequest, Resolving, StaticResolver, SystemResolver};
pub use target::{IpVersion, Labels, Target, TargetSetContext};
