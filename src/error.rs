use thiserror::Error;

/// Store-layer error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
///
/// Hierarchy integrity anomalies (cycles, excessive depth) are deliberately
/// absent here: they are recovered locally with a partial ancestor set and a
/// warning, never surfaced as errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error wrapper; the underlying storage failure is unchanged.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
