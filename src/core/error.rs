//! Error types for bin-set operations.

/// Result type for bin-set operations.
pub type BinResult<T> = Result<T, BinError>;

/// Error type for bin-set operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BinError {
    /// The one-non-occurrence-bin invariant is violated, or a
    /// non-occurrence bin appears for a target that does not allow one.
    #[error("Malformed bins: {0}")]
    MalformedBins(String),

    /// No bin contains the queried value.
    #[error("Bin value not found")]
    NotFound,
}
