//! Configured header handling.
//!
//! Probe configurations carry one ordered header list in which an entry
//! literally named `Host` doubles as the Host header override. The list is
//! split once per build into ordinary headers and that override.

use super::constants::HOST_HEADER;

/// Configured headers after the `Host` entries have been diverted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitHeaders {
    /// Headers in configuration order, `Host` excluded.
    pub headers: Vec<(String, String)>,
    /// Value of the last `Host` entry, if any was configured.
    pub host_override: Option<String>,
}

impl SplitHeaders {
    /// The override value when it is set and non-empty.
    pub fn host(&self) -> Option<&str> {
        self.host_override.as_deref().filter(|h| !h.is_empty())
    }
}

/// Splits a flat header list into ordinary headers and the Host override.
///
/// Later `Host` entries overwrite earlier ones, including with an empty value.
/// Only the exact name `Host` is diverted.
pub fn split_headers(headers: &[(String, String)]) -> SplitHeaders {
    let mut split = SplitHeaders::default();
    for (name, value) in headers {
        if name == HOST_HEADER {
            split.host_override = Some(value.clone());
            continue;
        }
        split.headers.push((name.clone(), value.clone()));
    }
    split
}
