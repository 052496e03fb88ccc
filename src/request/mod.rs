//! HTTP request synthesis.
//!
//! This module turns a target and a probe configuration into a fully
//! specified, immutable request description:
//! - Address resolution (when the probe resolves targets first)
//! - URL assembly (host, port, path)
//! - Host header selection
//! - Body wrapping
//!
//! Sending the request is left to the transport; [`ProbeRequest::to_reqwest`]
//! converts the description for a reqwest-based one.

mod body;
mod builder;

use std::collections::HashMap;

use reqwest::header::{HeaderName, HeaderValue, CONTENT_LENGTH, HOST};
use reqwest::Method;
use url::Url;

use crate::error_handling::BuildError;

// Re-export public API
pub use body::{BodyRead, RequestBody};
pub use builder::build_request;

/// A fully specified request for one target.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Name of the target this request was built for.
    pub target: String,
    pub method: Method,
    /// Assembled URL, exactly as built (no normalization).
    pub url: String,
    parsed_url: Url,
    /// Configured headers, never containing `Host`.
    pub headers: HashMap<String, String>,
    /// Value to send as the Host header.
    pub host_header: String,
    pub content_length: u64,
    /// `None` when the configured body is empty.
    pub body: Option<RequestBody>,
}

impl ProbeRequest {
    /// The URL after parsing, as a transport would use it.
    pub fn parsed_url(&self) -> &Url {
        &self.parsed_url
    }

    /// Converts this description into a `reqwest::Request`.
    ///
    /// No I/O happens here; the body shares the probe's buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Malformed`] if a header name or value cannot be
    /// represented on the wire.
    pub fn to_reqwest(&self) -> Result<reqwest::Request, BuildError> {
        let mut request = reqwest::Request::new(self.method.clone(), self.parsed_url.clone());

        let headers = request.headers_mut();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| self.malformed(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| self.malformed(format!("invalid header value {value:?}: {e}")))?;
            headers.insert(name, value);
        }

        let host = HeaderValue::from_str(&self.host_header).map_err(|e| {
            self.malformed(format!("invalid Host header {:?}: {e}", self.host_header))
        })?;
        headers.insert(HOST, host);

        if let Some(body) = &self.body {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(self.content_length));
            *request.body_mut() = Some(reqwest::Body::from(body.bytes()));
        }

        Ok(request)
    }

    fn malformed(&self, cause: String) -> BuildError {
        BuildError::Malformed {
            target: self.target.clone(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests;
