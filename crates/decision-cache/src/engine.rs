use async_trait::async_trait;

use crate::errors::DcResult;
use crate::key::DecisionParam;

/// The external authorization engine the cache fronts. Evaluation is
/// expected to be expensive; the coordinator calls it outside any shard
/// lock. Implementations report faults as `DcError::Engine`.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Single authorization decision for an ordered parameter tuple,
    /// usually (subject, object, action).
    async fn evaluate(&self, params: &[DecisionParam]) -> DcResult<bool>;

    /// Re-reads the policy from its source of truth.
    async fn reload_policy(&self) -> DcResult<()>;

    /// Removes one rule; the boolean reports whether a rule was removed.
    async fn remove_rule(&self, params: &[DecisionParam]) -> DcResult<bool>;

    /// Batch removal of plain-string rules.
    async fn remove_rules(&self, rules: &[Vec<String>]) -> DcResult<bool>;
}
