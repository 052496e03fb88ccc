//! Configuration types and CLI options.
//!
//! This module defines the probe configuration consumed by the request
//! builder, plus the logging enums used by the command-line interface.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use clap::ValueEnum;

use crate::config::constants::{DEFAULT_METHOD, DEFAULT_PROTOCOL};
use crate::config::headers::{split_headers, SplitHeaders};
use crate::config::labels::LabelProcessor;
use crate::target::IpVersion;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Whether to resolve targets before building the request URL.
///
/// Three-valued so that "not configured" stays distinguishable from an
/// explicit `false`: only `Unset` lets the target decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveFirst {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl ResolveFirst {
    /// Effective value for a target; `Unset` defers to `target_has_ip`.
    pub fn decide(self, target_has_ip: bool) -> bool {
        match self {
            ResolveFirst::Unset => target_has_ip,
            ResolveFirst::Enabled => true,
            ResolveFirst::Disabled => false,
        }
    }
}

impl From<Option<bool>> for ResolveFirst {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => ResolveFirst::Unset,
            Some(true) => ResolveFirst::Enabled,
            Some(false) => ResolveFirst::Disabled,
        }
    }
}

impl From<bool> for ResolveFirst {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

/// HTTP probe configuration.
///
/// Validated elsewhere; the request builder only reads it. A single
/// configuration is shared by every target of a probe, possibly across tasks.
///
/// # Examples
///
/// ```
/// use probe_request::{ProbeConfig, ResolveFirst};
///
/// let config = ProbeConfig::default()
///     .with_protocol("https")
///     .with_port(8443)
///     .with_header("Host", "status.example.com")
///     .with_resolve_first(ResolveFirst::Enabled);
/// assert_eq!(config.split_headers().host(), Some("status.example.com"));
/// ```
#[derive(Clone)]
pub struct ProbeConfig {
    /// URL scheme, e.g. `http` or `https`
    pub protocol: String,
    /// HTTP method
    pub method: String,
    /// Port override; `None` or `Some(0)` defers to the target's port
    pub port: Option<u16>,
    /// URL path override; `None` or empty defers to the `relative_url` label
    pub path: Option<String>,
    pub resolve_first: ResolveFirst,
    /// IP family requested when resolving targets
    pub ip_version: IpVersion,
    /// Ordered header list; may contain `Host`
    pub headers: Vec<(String, String)>,
    /// Request body, shared read-only by every built request
    pub body: Bytes,
    pub label_processors: Vec<Arc<dyn LabelProcessor>>,
}

impl ProbeConfig {
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_resolve_first(mut self, resolve_first: impl Into<ResolveFirst>) -> Self {
        self.resolve_first = resolve_first.into();
        self
    }

    pub fn with_ip_version(mut self, ip_version: IpVersion) -> Self {
        self.ip_version = ip_version;
        self
    }

    /// Appends a header; order is preserved.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_label_processor(mut self, processor: Arc<dyn LabelProcessor>) -> Self {
        self.label_processors.push(processor);
        self
    }

    /// Port override, with `Some(0)` treated as unset.
    pub fn port_override(&self) -> Option<u16> {
        self.port.filter(|p| *p != 0)
    }

    /// Path override, with an empty string treated as unset.
    pub fn path_override(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    /// Splits the configured headers into ordinary headers and the Host override.
    pub fn split_headers(&self) -> SplitHeaders {
        split_headers(&self.headers)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            method: DEFAULT_METHOD.to_string(),
            port: None,
            path: None,
            resolve_first: ResolveFirst::Unset,
            ip_version: IpVersion::Any,
            headers: Vec::new(),
            body: Bytes::new(),
            label_processors: Vec::new(),
        }
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("protocol", &self.protocol)
            .field("method", &self.method)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("resolve_first", &self.resolve_first)
            .field("ip_version", &self.ip_version)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("label_processors", &self.label_processors.len())
            .finish()
    }
}
