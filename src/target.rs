//! Target descriptors.
//!
//! A target is a single endpoint under periodic monitoring. It carries a name,
//! free-form labels, an optional port and pre-resolved address, and the
//! resolution capability used when the probe resolves before building requests.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use clap::ValueEnum;
use tokio::time::Instant;

use crate::config::{FQDN_LABEL, RELATIVE_URL_LABEL};
use crate::error_handling::ResolveError;
use crate::resolver::{DefaultResolver, Resolve, ResolveRequest};

/// Per-target key/value metadata.
pub type Labels = HashMap<String, String>;

/// IP family requested from the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IpVersion {
    /// Either family; the first address returned wins.
    #[default]
    Any,
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl IpVersion {
    /// Returns true if `ip` belongs to this family.
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::Any => true,
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::Any => write!(f, "IP"),
            IpVersion::V4 => write!(f, "IPv4"),
            IpVersion::V6 => write!(f, "IPv6"),
        }
    }
}

/// Context of the target set currently being probed.
///
/// Handed to the resolver on every lookup. The deadline bounds how long a
/// resolver may block; the request builder itself never applies a timeout.
#[derive(Debug, Clone, Default)]
pub struct TargetSetContext {
    /// Name of the target set (used in logs).
    pub name: String,
    /// Instant after which resolution should give up.
    pub deadline: Option<Instant>,
}

impl TargetSetContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A monitored endpoint.
#[derive(Clone)]
pub struct Target {
    /// Identifying name (hostname or arbitrary key).
    pub name: String,
    /// Target labels, mutated by label processors during request building.
    pub labels: Labels,
    /// Target's own port, 0 when unset.
    pub port: u16,
    /// Pre-resolved address, if discovery provided one.
    pub ip: Option<IpAddr>,
    resolver: Arc<dyn Resolve>,
}

impl Target {
    /// Creates a target bound to the [`DefaultResolver`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
            port: 0,
            ip: None,
            resolver: Arc::new(DefaultResolver),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Binds a different resolution capability to this target.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the label value, treating an empty value as missing.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The `fqdn` label, when present and non-empty.
    pub fn fqdn(&self) -> Option<&str> {
        self.label(FQDN_LABEL)
    }

    /// The `relative_url` label, when present and non-empty.
    pub fn relative_url(&self) -> Option<&str> {
        self.label(RELATIVE_URL_LABEL)
    }

    /// Resolves this target to an address using its bound resolver.
    ///
    /// # Errors
    ///
    /// Returns whatever the resolver reports; the caller decides whether to
    /// skip the target for the current round.
    pub async fn resolve(
        &self,
        ip_version: IpVersion,
        ctx: &TargetSetContext,
    ) -> Result<IpAddr, ResolveError> {
        let request = ResolveRequest {
            name: self.name.clone(),
            ip: self.ip,
            ip_version,
            deadline: ctx.deadline,
        };
        self.resolver.resolve(request).await
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("port", &self.port)
            .field("ip", &self.ip)
            .finish_non_exhaustive()
    }
}
