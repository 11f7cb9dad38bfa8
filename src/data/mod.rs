//! External data collaborators.
//!
//! Traits for the incidence statistics service, the payload cache and the
//! baseline reference table, plus the shipped implementations. The truth
//! service takes these by `Arc<dyn …>` so tests inject in-memory doubles.

pub mod baseline;
pub mod cache;
pub mod error;
pub mod provider;

pub use baseline::{
    BaselineEntry, BaselineSource, BaselineTable, BaselineTableProvider, RefreshingBaselines,
    StaticBaselines,
};
pub use cache::{Cache, CacheKey, FileCache, MemoryCache};
pub use error::{DataError, DataResult};
pub use provider::{rows_to_series, EpidataClient, IncidenceProvider, IncidenceRow};
