//! Label processors.
//!
//! Label processors run once per request build, after resolution and before
//! the URL is assembled. Each one sees the target, the address resolved this
//! round (empty when no resolution happened), and the effective port.

use crate::target::Target;

/// Per-target label mutation applied while building a request.
pub trait LabelProcessor: Send + Sync {
    fn update_for_target(&self, target: &mut Target, address: &str, port: u16);
}

impl<F> LabelProcessor for F
where
    F: Fn(&mut Target, &str, u16) + Send + Sync,
{
    fn update_for_target(&self, target: &mut Target, address: &str, port: u16) {
        self(target, address, port)
    }
}

/// A label whose value is rendered from target attributes.
///
/// Supported tokens:
/// - `@target.name@`
/// - `@target.ip@` (the address resolved this round, empty otherwise)
/// - `@target.port@` (empty when the port is 0)
/// - `@target.label.<key>@` (empty when the label is missing)
///
/// Anything else between `@` signs is copied through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalLabel {
    pub key: String,
    pub template: String,
}

impl AdditionalLabel {
    pub fn new(key: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            template: template.into(),
        }
    }

    /// Renders the template for one target.
    pub fn render(&self, target: &Target, address: &str, port: u16) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('@') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('@') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let token = &after[..end];
            match substitute(token, target, address, port) {
                Some(value) => {
                    out.push_str(&value);
                    rest = &after[end + 1..];
                }
                None => {
                    // Not a token; keep the leading '@' and rescan from the next one
                    out.push('@');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn substitute(token: &str, target: &Target, address: &str, port: u16) -> Option<String> {
    match token {
        "target.name" => Some(target.name.clone()),
        "target.ip" => Some(address.to_string()),
        "target.port" if port == 0 => Some(String::new()),
        "target.port" => Some(port.to_string()),
        _ => token
            .strip_prefix("target.label.")
            .map(|key| target.labels.get(key).cloned().unwrap_or_default()),
    }
}

impl LabelProcessor for AdditionalLabel {
    fn update_for_target(&self, target: &mut Target, address: &str, port: u16) {
        let value = self.render(target, address, port);
        target.labels.insert(self.key.clone(), value);
    }
}
