//! Publish loop metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared between the publish loop and its owner
#[derive(Debug, Default)]
pub struct PublishMetrics {
    /// Values taken from the queue
    received_count: AtomicU64,
    /// Successful sends
    published_count: AtomicU64,
    /// Sends the broker client reported as failed
    failure_count: AtomicU64,
    /// Envelopes the value encoder rejected
    encode_failure_count: AtomicU64,
    /// Sum of send latencies, microseconds
    send_micros_total: AtomicU64,
}

impl PublishMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received_count(&self) -> u64 {
        self.received_count.load(Ordering::Relaxed)
    }

    pub fn inc_received_count(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn published_count(&self) -> u64 {
        self.published_count.load(Ordering::Relaxed)
    }

    /// Record a successful send and its latency
    pub fn record_published(&self, latency: Duration) {
        self.published_count.fetch_add(1, Ordering::Relaxed);
        self.send_micros_total
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn encode_failure_count(&self) -> u64 {
        self.encode_failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_encode_failure_count(&self) {
        self.encode_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> PublishSnapshot {
        let published = self.published_count();
        let total_micros = self.send_micros_total.load(Ordering::Relaxed);
        PublishSnapshot {
            received: self.received_count(),
            published,
            failed: self.failure_count(),
            encode_failures: self.encode_failure_count(),
            mean_send_ms: if published > 0 {
                total_micros as f64 / published as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}

/// Snapshot of publish metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PublishSnapshot {
    pub received: u64,
    pub published: u64,
    pub failed: u64,
    pub encode_failures: u64,
    pub mean_send_ms: f64,
}
