//! Per-target request synthesis.

use std::collections::HashMap;

use log::{debug, error};
use reqwest::Method;
use url::Url;

use crate::config::ProbeConfig;
use crate::error_handling::BuildError;
use crate::request::{ProbeRequest, RequestBody};
use crate::target::{Target, TargetSetContext};

fn host_with_port(host: &str, port: u16) -> String {
    if port == 0 {
        return host.to_string();
    }
    format!("{host}:{port}")
}

/// Wraps literal IPv6 hosts in square brackets for use in a URL.
///
/// Same rule as joining a host and port, but applied whether or not a port
/// follows.
fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

/// Host used in the URL when the target isn't resolved first.
fn url_host_for_target(target: &Target) -> &str {
    target.fqdn().unwrap_or(&target.name)
}

/// Request's Host header for a target.
///  - A Host header configured on the probe overrides everything else.
///  - If the target's fqdn is provided in its labels, use that along with the port.
///  - Finally, use the target's name with the port.
fn host_header_for_target(target: &Target, probe_host_header: Option<&str>, port: u16) -> String {
    if let Some(host) = probe_host_header {
        return host.to_string();
    }
    host_with_port(url_host_for_target(target), port)
}

fn rel_url_for_target<'a>(target: &'a Target, config: &'a ProbeConfig) -> &'a str {
    config
        .path_override()
        .or_else(|| target.relative_url())
        .unwrap_or("")
}

fn parse_method(method: &str) -> Result<Method, String> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.as_bytes()).map_err(|e| format!("invalid method {method:?}: {e}"))
}

/// Builds the HTTP request for one target.
///
/// Label processors may rewrite the target's labels, which is why the target
/// is borrowed mutably. Nothing else is retained between calls, so different
/// targets can be built concurrently against the same configuration.
///
/// # Errors
///
/// - [`BuildError::Resolve`] if the target is resolved first and resolution fails.
/// - [`BuildError::Malformed`] if the assembled URL or the method is invalid.
///
/// Both are per-target: log them and move on to the next target.
pub async fn build_request(
    target: &mut Target,
    config: &ProbeConfig,
    ctx: &TargetSetContext,
) -> Result<ProbeRequest, BuildError> {
    // If the port is not configured explicitly, use the target's port
    let port = config.port_override().unwrap_or(target.port);

    let resolve_first = config.resolve_first.decide(target.ip.is_some());

    // Stays empty unless resolution happens this round, even when the
    // target carries a pre-set address
    let mut ip_for_label = String::new();
    if resolve_first {
        match target.resolve(config.ip_version, ctx).await {
            Ok(ip) => ip_for_label = ip.to_string(),
            Err(e) => {
                error!("target: {}, resolve error: {}", target.name, e);
                return Err(BuildError::Resolve {
                    target: target.name.clone(),
                    cause: e.to_string(),
                });
            }
        }
    }

    for processor in &config.label_processors {
        processor.update_for_target(target, &ip_for_label, port);
    }

    let url_host = if resolve_first {
        bracket_ipv6(&ip_for_label)
    } else {
        bracket_ipv6(url_host_for_target(target))
    };

    let url = format!(
        "{}://{}{}",
        config.protocol,
        host_with_port(&url_host, port),
        rel_url_for_target(target, config)
    );

    let malformed = |cause: String| {
        error!(
            "target: {}, error creating HTTP request: {}",
            target.name, cause
        );
        BuildError::Malformed {
            target: target.name.clone(),
            cause,
        }
    };
    let method = parse_method(&config.method).map_err(&malformed)?;
    let parsed_url = Url::parse(&url).map_err(|e| malformed(format!("invalid URL {url:?}: {e}")))?;

    let body = (!config.body.is_empty()).then(|| RequestBody::new(config.body.clone()));

    let split = config.split_headers();
    let host_header = host_header_for_target(target, split.host(), port);

    let mut headers = HashMap::with_capacity(split.headers.len());
    for (name, value) in split.headers {
        headers.insert(name, value);
    }

    debug!(
        "target: {}, built {} {} (Host: {})",
        target.name, method, url, host_header
    );

    Ok(ProbeRequest {
        target: target.name.clone(),
        method,
        url,
        parsed_url,
        headers,
        host_header,
        content_length: config.body.len() as u64,
        body,
    })
}
