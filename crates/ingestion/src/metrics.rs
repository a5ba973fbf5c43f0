//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-outcome request counters
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total requests seen
    pub requests: AtomicU64,

    /// Requests handed to the publish loop
    pub accepted: AtomicU64,

    /// Body read failures and oversized bodies
    pub body_errors: AtomicU64,

    /// Envelopes rejected by the encoder
    pub encode_errors: AtomicU64,

    /// Requests turned away by the overload policy
    pub overloaded: AtomicU64,

    /// Requests arriving after the queue closed
    pub shutting_down: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_body_error(&self) {
        self.body_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_overloaded(&self) {
        self.overloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shutting_down(&self) {
        self.shutting_down.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            body_errors: self.body_errors.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            overloaded: self.overloaded.load(Ordering::Relaxed),
            shutting_down: self.shutting_down.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub accepted: u64,
    pub body_errors: u64,
    pub encode_errors: u64,
    pub overloaded: u64,
    pub shutting_down: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let metrics = IngestionMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_accepted();
        metrics.record_overloaded();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.overloaded, 1);
        assert_eq!(snapshot.body_errors, 0);
    }
}
