//! Core domain models for forecast scoring.
//!
//! This module defines the fundamental data structures used throughout the
//! crate: bins and bin-set operations, the closed region/target
//! enumerations, forecasts, truth records and scores.

pub mod bins;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod table;

pub use domain::{
    Bin, IncidencePoint, IncidenceSeries, RegionId, Score, TargetId, TargetType, Truth,
    REGION_COUNT, TARGET_COUNT,
};
pub use error::{BinError, BinResult};
pub use forecast::{Forecast, ForecastCell};
pub use table::{RegionTable, RegionTargetTable};
