//! Target resolution.
//!
//! Resolvers turn a target into a single IP address. The trait mirrors
//! `reqwest::dns::Resolve`: it takes an owned request and returns a boxed
//! future, so implementations can be shared behind an `Arc` and the lookup can
//! be cancelled by dropping the future.

use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;

use tokio::time::Instant;

use crate::error_handling::ResolveError;
use crate::target::IpVersion;

/// Future returned by [`Resolve::resolve`].
pub type Resolving = Pin<Box<dyn Future<Output = Result<IpAddr, ResolveError>> + Send>>;

/// Everything a resolver needs to know about one lookup.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Target name to look up.
    pub name: String,
    /// Address already known for the target, if any.
    pub ip: Option<IpAddr>,
    /// Requested IP family.
    pub ip_version: IpVersion,
    /// Deadline taken from the target-set context.
    pub deadline: Option<Instant>,
}

/// Resolution capability bound to a target.
pub trait Resolve: Send + Sync {
    fn resolve(&self, request: ResolveRequest) -> Resolving;
}

/// Resolver used for targets that don't bind their own.
///
/// Returns the target's pre-set address when there is one. A pre-set address
/// of the wrong family is an error rather than a reason to look the name up.
/// Targets without an address are resolved through [`SystemResolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl Resolve for DefaultResolver {
    fn resolve(&self, request: ResolveRequest) -> Resolving {
        match request.ip {
            Some(ip) if request.ip_version.matches(&ip) => Box::pin(async move { Ok(ip) }),
            Some(ip) => Box::pin(async move {
                Err(ResolveError::VersionMismatch {
                    name: request.name,
                    ip,
                    version: request.ip_version,
                })
            }),
            None => SystemResolver.resolve(request),
        }
    }
}

/// Resolves names with the operating system resolver (`getaddrinfo`).
///
/// Honors the request deadline; returns the first address of the requested
/// family.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, request: ResolveRequest) -> Resolving {
        Box::pin(async move {
            let ResolveRequest {
                name,
                ip_version,
                deadline,
                ..
            } = request;

            // Literal addresses need no lookup
            if let Ok(ip) = name.parse::<IpAddr>() {
                return if ip_version.matches(&ip) {
                    Ok(ip)
                } else {
                    Err(ResolveError::VersionMismatch {
                        name,
                        ip,
                        version: ip_version,
                    })
                };
            }

            let lookup = tokio::net::lookup_host((name.as_str(), 0));
            let addrs = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, lookup)
                    .await
                    .map_err(|_| ResolveError::DeadlineExceeded(name.clone()))?,
                None => lookup.await,
            }
            .map_err(|e| ResolveError::Lookup {
                name: name.clone(),
                cause: e.to_string(),
            })?;

            let ip = addrs
                .map(|addr| addr.ip())
                .find(|ip| ip_version.matches(ip))
                .ok_or_else(|| ResolveError::NoAddress {
                    name: name.clone(),
                    version: ip_version,
                })?;
            log::debug!("resolved {name} to {ip}");
            Ok(ip)
        })
    }
}

/// Resolver that always returns the same outcome.
///
/// Useful for targets whose address is managed outside of DNS, and in tests.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    outcome: Result<IpAddr, ResolveError>,
}

impl StaticResolver {
    pub fn new(ip: IpAddr) -> Self {
        Self { outcome: Ok(ip) }
    }

    pub fn failing(error: ResolveError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, _request: ResolveRequest) -> Resolving {
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}
