//! Build statistics tracking.
//!
//! Thread-safe counters for successful builds and per-kind failures, shared
//! across the tasks of one probing round.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Thread-safe request-building statistics.
///
/// Every [`FailureKind`] is initialized to zero on creation, so counters can
/// be incremented from many tasks without locking. Share it with `Arc`.
pub struct BuildStats {
    successful: AtomicUsize,
    failures: HashMap<FailureKind, AtomicUsize>,
}

impl BuildStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        BuildStats {
            successful: AtomicUsize::new(0),
            failures,
        }
    }

    pub fn increment_successful(&self) {
        self.successful.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment a failure counter.
    pub fn increment_failure(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map. \
                 This indicates a bug in BuildStats initialization.",
                kind
            );
        }
    }

    pub fn successful(&self) -> usize {
        self.successful.load(Ordering::SeqCst)
    }

    /// Get the count for a failure kind.
    ///
    /// Returns 0 if the kind is not in the map (should never happen if properly initialized).
    pub fn get_failure_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or_else(|| {
                log::warn!(
                    "Failure kind {:?} not found in stats map, returning 0. \
                     This indicates a bug in BuildStats initialization.",
                    kind
                );
                0
            })
    }

    /// Get total failure count across all kinds.
    pub fn total_failures(&self) -> usize {
        FailureKind::iter().map(|k| self.get_failure_count(k)).sum()
    }
}

impl Default for BuildStats {
    fn default() -> Self {
        Self::new()
    }
}
