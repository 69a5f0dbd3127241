use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::backend::CacheBackend;
use crate::config::CachePolicyView;
use crate::engine::DecisionEngine;
use crate::errors::{DcError, DcResult};
use crate::key::{build_key, build_rule_key, DecisionParam};
use crate::metrics::DcMetrics;
use crate::shard::ShardedStore;

/// Memoizing front for a [`DecisionEngine`].
///
/// Decisions are cached per derived key in a sharded store; policy-mutating
/// calls invalidate the affected entries before delegating to the engine.
/// Invalidation on rule removal is exact-key only: entries that are merely
/// transitively affected (for example through role hierarchies) stay stale
/// until the next reload or explicit invalidation. That trade-off is
/// deliberate and callers relying on hierarchy-sensitive freshness should
/// call `invalidate_all` after mutations.
pub struct CachedDecisionPoint {
    engine: Arc<dyn DecisionEngine>,
    store: ShardedStore,
    enabled: AtomicBool,
    expire_after_ms: AtomicU64,
    metrics: DcMetrics,
}

impl CachedDecisionPoint {
    pub fn new(engine: Arc<dyn DecisionEngine>) -> Self {
        Self::with_policy(engine, CachePolicyView::default())
    }

    pub fn with_policy(engine: Arc<dyn DecisionEngine>, policy: CachePolicyView) -> Self {
        Self {
            store: ShardedStore::new(policy.shard_count),
            enabled: AtomicBool::new(policy.enabled),
            expire_after_ms: AtomicU64::new(policy.expire_after_ms),
            metrics: DcMetrics::default(),
            engine,
        }
    }

    pub fn metrics(&self) -> DcMetrics {
        self.metrics.clone()
    }

    pub fn shard_count(&self) -> usize {
        self.store.shard_count()
    }

    /// Toggles memoization. Disabling is non-destructive: existing entries
    /// survive and become visible again once re-enabled.
    pub fn enable_cache(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn cache_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// TTL applied to future stores only; existing entries keep theirs.
    pub fn set_expire_after(&self, after: Option<Duration>) {
        let millis = after.map_or(0, |after| u64::try_from(after.as_millis()).unwrap_or(u64::MAX));
        self.expire_after_ms.store(millis, Ordering::Relaxed);
    }

    fn expire_after(&self) -> Option<Duration> {
        let millis = self.expire_after_ms.load(Ordering::Relaxed);
        (millis > 0).then(|| Duration::from_millis(millis))
    }

    /// Swaps the backend of the shard owning `key`'s hash. Escape hatch for
    /// migrating a slice of the keyspace to a different storage
    /// implementation.
    pub async fn set_backend(&self, key: &str, backend: Box<dyn CacheBackend>) {
        self.store.replace_backend(key, backend).await;
    }

    /// Cached authorization decision.
    ///
    /// Bypasses the store entirely while disabled or when the request is not
    /// key-eligible. A backend fault on read propagates without evaluating;
    /// an engine fault propagates without caching; a store fault after a
    /// successful evaluation still surfaces, because caching state is now
    /// inconsistent with the computed decision.
    pub async fn decide(&self, params: &[DecisionParam]) -> DcResult<bool> {
        if !self.cache_enabled() {
            self.metrics.record_bypass();
            return self.engine.evaluate(params).await;
        }
        let Some(key) = build_key(params) else {
            self.metrics.record_bypass();
            debug!("request not key-eligible, evaluating directly");
            return self.engine.evaluate(params).await;
        };

        match self.store.get(&key).await {
            Ok(decision) => {
                self.metrics.record_hit();
                debug!(%key, decision, "cache hit");
                return Ok(decision);
            }
            Err(DcError::NoSuchKey) => {}
            Err(err) => {
                self.metrics.record_backend_error();
                warn!(%key, "cache read failed: {err}");
                return Err(err);
            }
        }

        self.metrics.record_miss();
        // Evaluation runs outside any shard lock.
        let decision = self.engine.evaluate(params).await?;
        if let Err(err) = self.store.set(&key, decision, self.expire_after()).await {
            self.metrics.record_backend_error();
            warn!(%key, "decision computed but caching it failed: {err}");
            return Err(err);
        }
        self.metrics.record_store();
        Ok(decision)
    }

    /// Clears every shard before delegating the reload, so no stale decision
    /// survives a policy change. A failing clear aborts the reload.
    pub async fn load_policy(&self) -> DcResult<()> {
        if self.cache_enabled() {
            self.store.clear_all().await?;
            self.metrics.record_invalidation();
        }
        self.engine.reload_policy().await
    }

    /// Evicts the exact-match entry for the removed rule, then delegates the
    /// removal itself to the engine.
    pub async fn remove_rule(&self, params: &[DecisionParam]) -> DcResult<bool> {
        if self.cache_enabled() {
            if let Some(key) = build_key(params) {
                self.evict(&key).await?;
            }
        }
        self.engine.remove_rule(params).await
    }

    pub async fn remove_rules(&self, rules: &[Vec<String>]) -> DcResult<bool> {
        if self.cache_enabled() {
            for rule in rules {
                self.evict(&build_rule_key(rule)).await?;
            }
        }
        self.engine.remove_rules(rules).await
    }

    /// Deletes all cached decisions across every shard.
    pub async fn invalidate_all(&self) -> DcResult<()> {
        let result = self.store.invalidate_all().await;
        match &result {
            Ok(()) => self.metrics.record_invalidation(),
            Err(err) => {
                self.metrics.record_backend_error();
                warn!("cache invalidation incomplete: {err}");
            }
        }
        result
    }

    async fn evict(&self, key: &str) -> DcResult<()> {
        match self.store.delete(key).await {
            Ok(()) | Err(DcError::NoSuchKey) => Ok(()),
            Err(err) => {
                self.metrics.record_backend_error();
                warn!(%key, "cache eviction failed: {err}");
                Err(err)
            }
        }
    }
}

/// The coordinator is itself an engine, so it composes as a drop-in
/// decorated replacement wherever a [`DecisionEngine`] is expected.
#[async_trait]
impl DecisionEngine for CachedDecisionPoint {
    async fn evaluate(&self, params: &[DecisionParam]) -> DcResult<bool> {
        self.decide(params).await
    }

    async fn reload_policy(&self) -> DcResult<()> {
        self.load_policy().await
    }

    async fn remove_rule(&self, params: &[DecisionParam]) -> DcResult<bool> {
        CachedDecisionPoint::remove_rule(self, params).await
    }

    async fn remove_rules(&self, rules: &[Vec<String>]) -> DcResult<bool> {
        CachedDecisionPoint::remove_rules(self, rules).await
    }
}

/// Builder helper to keep construction extendable.
pub struct DecisionPointBuilder {
    engine: Arc<dyn DecisionEngine>,
    policy: CachePolicyView,
}

impl DecisionPointBuilder {
    pub fn new(engine: Arc<dyn DecisionEngine>) -> Self {
        Self {
            engine,
            policy: CachePolicyView::default(),
        }
    }

    pub fn with_policy(mut self, policy: CachePolicyView) -> Self {
        self.policy = policy;
        self
    }

    pub fn shards(mut self, shard_count: usize) -> Self {
        self.policy.shard_count = shard_count;
        self
    }

    pub fn expire_after(mut self, after: Duration) -> Self {
        self.policy.expire_after_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.policy.enabled = false;
        self
    }

    pub fn build(self) -> Arc<CachedDecisionPoint> {
        Arc::new(CachedDecisionPoint::with_policy(self.engine, self.policy))
    }
}
