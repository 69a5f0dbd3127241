use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Cheap shared counters for cache behavior. Cloning shares the same
/// underlying counters.
#[derive(Clone, Default)]
pub struct DcMetrics {
    inner: Arc<DcMetricsInner>,
}

#[derive(Default)]
struct DcMetricsInner {
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
    stores: AtomicU64,
    invalidations: AtomicU64,
    backend_errors: AtomicU64,
}

impl DcMetrics {
    pub fn record_hit(&self) {
        self.inner.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bypass(&self) {
        self.inner.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store(&self) {
        self.inner.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.inner.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_error(&self) {
        self.inner.backend_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DcMetricsSnapshot {
        DcMetricsSnapshot {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            bypasses: self.inner.bypasses.load(Ordering::Relaxed),
            stores: self.inner.stores.load(Ordering::Relaxed),
            invalidations: self.inner.invalidations.load(Ordering::Relaxed),
            backend_errors: self.inner.backend_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DcMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub bypasses: u64,
    pub stores: u64,
    pub invalidations: u64,
    pub backend_errors: u64,
}
