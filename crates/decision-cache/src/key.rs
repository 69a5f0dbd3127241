use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Appended after every parameter so that `("ab", "c")` and `("a", "bc")`
/// derive distinct keys. Unlikely to appear in ordinary identifiers.
pub const KEY_SEPARATOR: &str = "$$";

/// Implemented by caller-supplied request types that are not plain strings
/// but still want to participate in caching. The returned key must be
/// deterministic for a given value.
pub trait CacheableParam: Send + Sync {
    fn cache_key(&self) -> String;
}

/// One positional argument of a decision request.
///
/// `Opaque` carries payloads the engine can evaluate but the cache cannot
/// key; its presence makes the whole request ineligible for memoization.
#[derive(Clone)]
pub enum DecisionParam {
    Text(String),
    Keyed(Arc<dyn CacheableParam>),
    Opaque(Value),
}

impl DecisionParam {
    pub fn text(value: impl Into<String>) -> Self {
        DecisionParam::Text(value.into())
    }

    pub fn keyed(param: impl CacheableParam + 'static) -> Self {
        DecisionParam::Keyed(Arc::new(param))
    }
}

impl From<&str> for DecisionParam {
    fn from(value: &str) -> Self {
        DecisionParam::Text(value.to_string())
    }
}

impl From<String> for DecisionParam {
    fn from(value: String) -> Self {
        DecisionParam::Text(value)
    }
}

impl From<Value> for DecisionParam {
    fn from(value: Value) -> Self {
        DecisionParam::Opaque(value)
    }
}

impl fmt::Debug for DecisionParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionParam::Text(value) => f.debug_tuple("Text").field(value).finish(),
            DecisionParam::Keyed(keyed) => f.debug_tuple("Keyed").field(&keyed.cache_key()).finish(),
            DecisionParam::Opaque(value) => f.debug_tuple("Opaque").field(value).finish(),
        }
    }
}

/// Derives the cache key for a request, in parameter order.
///
/// Returns `None` as soon as any parameter is neither text nor keyed; no
/// partial key is ever produced. Inapplicability is a normal control signal,
/// not an error.
pub fn build_key(params: &[DecisionParam]) -> Option<String> {
    let mut key = String::new();
    for param in params {
        match param {
            DecisionParam::Text(value) => key.push_str(value),
            DecisionParam::Keyed(keyed) => key.push_str(&keyed.cache_key()),
            DecisionParam::Opaque(_) => return None,
        }
        key.push_str(KEY_SEPARATOR);
    }
    Some(key)
}

/// Key derivation for batch rule removal, where every field is already a
/// plain string and the request is always applicable.
pub(crate) fn build_rule_key(rule: &[String]) -> String {
    let mut key = String::new();
    for field in rule {
        key.push_str(field);
        key.push_str(KEY_SEPARATOR);
    }
    key
}
