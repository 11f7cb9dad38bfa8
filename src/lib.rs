//! flucast - scoring and verification tools for probabilistic epidemic
//! forecasts.
//!
//! Forecasts arrive as discretized probability distributions (bins) plus a
//! point estimate per (region, target). This crate reconstructs ground
//! truth from incidence observations, scores forecasts against it with log
//! and error scores, aggregates scores across forecasts, and sanity-checks
//! submissions.
//!
//! Parsing of submission files into rows, the remote statistics service,
//! the on-disk cache and the baseline table are collaborators behind the
//! interfaces in [`parsing`] and [`data`].

pub mod config;
pub mod core;
pub mod data;
pub mod parsing;
pub mod services;
pub mod time;

pub use crate::config::Config;
pub use crate::core::{
    Bin, BinError, Forecast, ForecastCell, IncidencePoint, IncidenceSeries, RegionId, RegionTable,
    RegionTargetTable, Score, TargetId, TargetType, Truth,
};
pub use crate::services::{mean_scores, score_forecast, TruthService};
pub use crate::time::{Epiweek, SeasonId};
