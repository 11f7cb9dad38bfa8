//! Error types for the data collaborators.

use crate::core::domain::RegionId;
use crate::time::SeasonId;

/// Result type for data-layer operations.
pub type DataResult<T> = Result<T, DataError>;

/// Error type for data-layer operations.
///
/// `RemoteUnavailable` is recovered by the truth service (the season/lag is
/// treated as fully absent); the other variants surface to callers of the
/// individual collaborators.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Remote data unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No baseline for region {region} in season {season}")]
    BaselineMissing { region: RegionId, season: SeasonId },
}
