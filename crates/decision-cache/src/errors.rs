use thiserror::Error;

pub type DcResult<T> = Result<T, DcError>;

/// Error taxonomy for cache-mediated decisions.
///
/// `NoSuchKey` is the benign miss signal: it drives recomputation and is
/// never surfaced to callers of the coordinator. `Backend` and `Engine`
/// failures are surfaced verbatim; conflating them with `NoSuchKey` would
/// break either cold-cache behavior or fault visibility.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DcError {
    #[error("no cached decision for key")]
    NoSuchKey,
    #[error("cache backend failure: {0}")]
    Backend(String),
    #[error("decision engine failure: {0}")]
    Engine(String),
}

impl DcError {
    pub fn is_no_such_key(&self) -> bool {
        matches!(self, DcError::NoSuchKey)
    }
}
