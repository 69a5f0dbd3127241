use std::time::Duration;

use tokio::sync::RwLock;

use crate::backend::{CacheBackend, MemoryBackend};
use crate::errors::DcResult;

/// Balance between per-shard memory overhead and lock contention under
/// concurrent load.
pub const DEFAULT_SHARD_COUNT: usize = 32;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the key bytes. Order-dependent by construction.
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Fixed array of independently locked backends. The shard count is chosen
/// at construction and never changes; there is no rehashing or resizing.
/// Every operation locks exactly one shard, except `invalidate_all`, which
/// takes the write locks in ascending index order.
pub struct ShardedStore {
    shards: Vec<RwLock<Box<dyn CacheBackend>>>,
}

impl ShardedStore {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| RwLock::new(Box::new(MemoryBackend::new()) as Box<dyn CacheBackend>))
            .collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Same key, same shard, for the lifetime of this store.
    pub fn shard_index(&self, key: &str) -> usize {
        fnv1a32(key.as_bytes()) as usize % self.shards.len()
    }

    pub async fn get(&self, key: &str) -> DcResult<bool> {
        let shard = &self.shards[self.shard_index(key)];
        let backend = shard.read().await;
        backend.get(key).await
    }

    pub async fn set(&self, key: &str, decision: bool, ttl: Option<Duration>) -> DcResult<()> {
        let shard = &self.shards[self.shard_index(key)];
        let backend = shard.write().await;
        backend.set(key, decision, ttl).await
    }

    pub async fn delete(&self, key: &str) -> DcResult<()> {
        let shard = &self.shards[self.shard_index(key)];
        let backend = shard.write().await;
        backend.delete(key).await
    }

    /// Sequential fail-fast clear: aborts on the first shard that refuses.
    /// Used before a policy reload, where a partial wipe must not be papered
    /// over.
    pub async fn clear_all(&self) -> DcResult<()> {
        for shard in &self.shards {
            let backend = shard.write().await;
            backend.clear().await?;
        }
        Ok(())
    }

    /// Clears every shard under a simultaneous hold of all write locks,
    /// acquired in ascending index order. Remaining shards are still cleared
    /// after a failure; the first error wins.
    pub async fn invalidate_all(&self) -> DcResult<()> {
        let mut guards = Vec::with_capacity(self.shards.len());
        for shard in &self.shards {
            guards.push(shard.write().await);
        }
        let mut first_error = None;
        for backend in &guards {
            if let Err(err) = backend.clear().await {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Swaps the backend of the shard owning `key`. Runs as a write under
    /// that shard's lock so no in-flight operation keeps a stale reference.
    pub async fn replace_backend(&self, key: &str, backend: Box<dyn CacheBackend>) {
        let shard = &self.shards[self.shard_index(key)];
        *shard.write().await = backend;
    }
}
