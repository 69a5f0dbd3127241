use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::{DcError, DcResult};

/// Pluggable storage behind one shard.
///
/// `get` answers `DcError::NoSuchKey` for absent entries; any other error is
/// a backend fault and is surfaced to callers. TTL interpretation belongs
/// entirely to the backend; a backend may ignore it.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> DcResult<bool>;
    async fn set(&self, key: &str, decision: bool, ttl: Option<Duration>) -> DcResult<()>;
    /// Removing an absent key answers `NoSuchKey`; callers may ignore it.
    async fn delete(&self, key: &str) -> DcResult<()>;
    async fn clear(&self) -> DcResult<()>;
}

#[derive(Clone, Copy)]
struct Entry {
    decision: bool,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// Default in-process backend. Expiry is lazy: an expired entry reads as
/// `NoSuchKey` and is dropped when observed.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Entry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> DcResult<bool> {
        let now = Instant::now();
        let stale = match self.entries.get(key) {
            Some(entry) => {
                if !entry.expired(now) {
                    return Ok(entry.decision);
                }
                true
            }
            None => false,
        };
        if stale {
            self.entries.remove_if(key, |_, entry| entry.expired(now));
        }
        Err(DcError::NoSuchKey)
    }

    async fn set(&self, key: &str, decision: bool, ttl: Option<Duration>) -> DcResult<()> {
        let entry = Entry {
            decision,
            expires_at: ttl.map(|after| Instant::now() + after),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> DcResult<()> {
        match self.entries.remove(key) {
            Some(_) => Ok(()),
            None => Err(DcError::NoSuchKey),
        }
    }

    async fn clear(&self) -> DcResult<()> {
        self.entries.clear();
        Ok(())
    }
}
