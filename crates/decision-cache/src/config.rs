use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shard::DEFAULT_SHARD_COUNT;

/// Construction-time policy snapshot for the decision cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicyView {
    /// Whether memoization starts enabled. Toggling later is non-destructive.
    pub enabled: bool,
    /// Number of independently locked cache partitions, fixed for the
    /// lifetime of the coordinator. Values below 1 are clamped to 1.
    pub shard_count: usize,
    /// TTL applied to future stores, in milliseconds. 0 disables expiry.
    pub expire_after_ms: u64,
}

impl Default for CachePolicyView {
    fn default() -> Self {
        Self {
            enabled: true,
            shard_count: DEFAULT_SHARD_COUNT,
            expire_after_ms: 0,
        }
    }
}

impl CachePolicyView {
    pub fn expire_after(&self) -> Option<Duration> {
        (self.expire_after_ms > 0).then(|| Duration::from_millis(self.expire_after_ms))
    }
}
