//! An immutable, normalized forecast submission.

use crate::core::bins::confidence_range;
use crate::core::domain::{Bin, RegionId, TargetId};
use crate::core::table::RegionTargetTable;
use crate::time::{season_of, Epiweek, SeasonId};

/// Distribution and point estimate for one (region, target) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastCell {
    /// Sorted bins; week boundaries already resolved to absolute epiweeks.
    pub bins: Vec<Bin>,
    /// Point estimate; `None` stands for the non-occurrence prediction.
    pub point: Option<f64>,
}

/// One model's forecast for one epiweek, covering every (region, target)
/// pair. Immutable after construction; built from raw rows by
/// [`crate::parsing::assemble_forecast`].
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    model: String,
    epiweek: Epiweek,
    cells: RegionTargetTable<ForecastCell>,
}

impl Forecast {
    pub fn new(
        model: impl Into<String>,
        epiweek: Epiweek,
        cells: RegionTargetTable<ForecastCell>,
    ) -> Self {
        Forecast { model: model.into(), epiweek, cells }
    }

    /// Identifier of the model that produced this forecast.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Epiweek the forecast was issued for.
    pub fn epiweek(&self) -> Epiweek {
        self.epiweek
    }

    /// Season the forecast belongs to.
    pub fn season(&self) -> SeasonId {
        season_of(self.epiweek)
    }

    /// Sorted bins for the given region and target.
    pub fn bins(&self, region: RegionId, target: TargetId) -> &[Bin] {
        &self.cells.get(region, target).bins
    }

    /// Point estimate for the given region and target, straight from the
    /// submission. Consistency with the bins is the verifier's job.
    pub fn point(&self, region: RegionId, target: TargetId) -> Option<f64> {
        self.cells.get(region, target).point
    }

    /// Low and high bin boundaries for the given confidence level.
    pub fn confidence_range(
        &self,
        region: RegionId,
        target: TargetId,
        ci_percent: f64,
    ) -> (Option<f64>, Option<f64>) {
        confidence_range(self.bins(region, target), ci_percent)
    }
}
