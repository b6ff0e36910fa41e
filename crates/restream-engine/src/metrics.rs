//! Request counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests taken off the channel.
    pub received: u64,

    /// Requests acknowledged.
    pub acknowledged: u64,

    /// Requests rejected.
    pub rejected: u64,

    /// Sessions created and not yet disposed.
    pub live_sessions: u64,
}

/// Collects request counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    received: AtomicU64,
    acknowledged: AtomicU64,
    rejected: AtomicU64,
    live_sessions: AtomicU64,
}

impl EngineMetrics {
    /// Create a new collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request taken off the channel.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an acknowledged request.
    pub fn record_acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected request.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Update the live session gauge.
    pub fn set_live_sessions(&self, count: usize) {
        self.live_sessions.store(count as u64, Ordering::Relaxed);
    }

    /// Get current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            acknowledged: self.acknowledged.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            live_sessions: self.live_sessions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = EngineMetrics::new();
        metrics.record_received();
        metrics.record_received();
        metrics.record_acknowledged();
        metrics.record_rejected();
        metrics.set_live_sessions(1);

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                received: 2,
                acknowledged: 1,
                rejected: 1,
                live_sessions: 1,
            }
        );
    }
}
