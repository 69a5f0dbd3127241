pub mod api;
pub mod backend;
pub mod config;
pub mod engine;
pub mod errors;
pub mod key;
pub mod metrics;
pub mod shard;

pub use api::{CachedDecisionPoint, DecisionPointBuilder};
pub use backend::{CacheBackend, MemoryBackend};
pub use config::CachePolicyView;
pub use engine::DecisionEngine;
pub use errors::{DcError, DcResult};
pub use key::{build_key, CacheableParam, DecisionParam, KEY_SEPARATOR};
pub use metrics::{DcMetrics, DcMetricsSnapshot};
pub use shard::{ShardedStore, DEFAULT_SHARD_COUNT};
