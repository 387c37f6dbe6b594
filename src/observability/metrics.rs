//! Write-pipeline counters
//!
//! Counters only, monotonic, thread-safe through atomics. Relaxed ordering
//! is enough here; readers tolerate slightly stale values.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for one store instance
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Writes applied against the remote store
    writes_applied: AtomicU64,
    /// Writes that failed at the remote boundary
    writes_failed: AtomicU64,
    /// Writes suppressed by the test-mode guard
    writes_suppressed: AtomicU64,
    /// Rows decoded into record types
    rows_decoded: AtomicU64,
    /// Rows that failed to decode
    decode_failures: AtomicU64,
    /// Reads served from the cache
    cache_hits: AtomicU64,
}

impl PipelineMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment applied writes
    pub fn increment_applied(&self) {
        self.writes_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed writes
    pub fn increment_failed(&self) {
        self.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment suppressed writes
    pub fn increment_suppressed(&self) {
        self.writes_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment decoded rows
    pub fn increment_decoded(&self) {
        self.rows_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment decode failures
    pub fn increment_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment cache hits
    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes_applied: self.writes_applied.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            writes_suppressed: self.writes_suppressed.load(Ordering::Relaxed),
            rows_decoded: self.rows_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub writes_applied: u64,
    pub writes_failed: u64,
    pub writes_suppressed: u64,
    pub rows_decoded: u64,
    pub decode_failures: u64,
    pub cache_hits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = PipelineMetrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.writes_applied, 0);
        assert_eq!(snap.writes_failed, 0);
        assert_eq!(snap.writes_suppressed, 0);
        assert_eq!(snap.cache_hits, 0);
    }

    #[test]
    fn test_increments_are_visible_in_snapshot() {
        let metrics = PipelineMetrics::new();
        metrics.increment_applied();
        metrics.increment_applied();
        metrics.increment_failed();
        metrics.increment_suppressed();
        metrics.increment_decoded();
        metrics.increment_decode_failures();
        metrics.increment_cache_hits();

        let snap = metrics.snapshot();
        assert_eq!(snap.writes_applied, 2);
        assert_eq!(snap.writes_failed, 1);
        assert_eq!(snap.writes_suppressed, 1);
        assert_eq!(snap.rows_decoded, 1);
        assert_eq!(snap.decode_failures, 1);
        assert_eq!(snap.cache_hits, 1);
    }
}
