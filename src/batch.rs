//! Building requests for a whole target set.
//!
//! One probing round builds a request per target. Failures are per-target:
//! they are logged, counted, and the round carries on with the other targets.

use futures::future::join_all;
use log::{info, warn};

use crate::config::ProbeConfig;
use crate::error_handling::{BuildError, BuildStats};
use crate::request::{build_request, ProbeRequest};
use crate::target::{Target, TargetSetContext};

/// Requests and failures from one round, in target order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub requests: Vec<ProbeRequest>,
    pub failures: Vec<BuildError>,
}

/// Builds a request for every target concurrently.
///
/// Each target's label processors only touch that target, so the builds
/// share nothing but the read-only configuration.
pub async fn build_requests_with_failures(
    targets: &mut [Target],
    config: &ProbeConfig,
    ctx: &TargetSetContext,
    stats: &BuildStats,
) -> BatchOutcome {
    let builds = targets
        .iter_mut()
        .map(|target| build_request(target, config, ctx));
    let results = join_all(builds).await;

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(request) => {
                stats.increment_successful();
                outcome.requests.push(request);
            }
            Err(e) => {
                warn!("Skipping target {} this round: {}", e.target(), e.cause());
                stats.increment_failure(e.kind());
                outcome.failures.push(e);
            }
        }
    }

    info!(
        "Built {} request(s) for target set {:?} ({} failed)",
        outcome.requests.len(),
        ctx.name,
        outcome.failures.len()
    );
    outcome
}

/// Like [`build_requests_with_failures`], keeping only the built requests.
pub async fn build_requests(
    targets: &mut [Target],
    config: &ProbeConfig,
    ctx: &TargetSetContext,
    stats: &BuildStats,
) -> Vec<ProbeRequest> {
    build_requests_with_failures(targets, config, ctx, stats)
        .await
        .requests
}
