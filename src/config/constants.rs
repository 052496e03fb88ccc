//! Configuration constants.
//!
//! Defaults for probe configuration and the well-known target label keys.

use std::time::Duration;

/// Protocol used when the probe configuration doesn't name one.
pub const DEFAULT_PROTOCOL: &str = "http";

/// HTTP method used when the probe configuration doesn't name one.
pub const DEFAULT_METHOD: &str = "GET";

/// Target label carrying a fully-qualified domain name.
///
/// Preferred over the target name for both the URL host and the Host header.
pub const FQDN_LABEL: &str = "fqdn";

/// Target label carrying the per-target URL path to probe.
pub const RELATIVE_URL_LABEL: &str = "relative_url";

/// Header name that is diverted out of the configured header list and used
/// as the probe-level Host header override. Matched literally.
pub const HOST_HEADER: &str = "Host";

/// Resolution deadline applied by the CLI to each probing round.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(3);
