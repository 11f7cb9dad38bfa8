//! Baseline threshold collaborator.
//!
//! Onset derivation needs a per-(region, season) epidemic threshold from an
//! externally maintained reference table. The refreshing source re-fetches
//! its table whenever a requested season is not covered, so a process that
//! outlives a season rollover picks up the new thresholds without restart.

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::domain::RegionId;
use crate::data::error::{DataError, DataResult};
use crate::time::SeasonId;

/// One threshold of the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub region: RegionId,
    pub season: SeasonId,
    pub value: f64,
}

/// The full reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineTable {
    entries: Vec<BaselineEntry>,
}

impl BaselineTable {
    pub fn new(entries: Vec<BaselineEntry>) -> Self {
        BaselineTable { entries }
    }

    pub fn get(&self, region: RegionId, season: SeasonId) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.region == region && e.season == season)
            .map(|e| e.value)
    }

    /// Tell if the table carries any entry for the season.
    pub fn covers_season(&self, season: SeasonId) -> bool {
        self.entries.iter().any(|e| e.season == season)
    }
}

/// Baseline threshold collaborator.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    async fn baseline(&self, region: RegionId, season: SeasonId) -> DataResult<f64>;
}

/// Fixed in-memory table, for tests and offline runs.
#[derive(Debug, Default)]
pub struct StaticBaselines {
    table: BaselineTable,
}

impl StaticBaselines {
    pub fn new(table: BaselineTable) -> Self {
        StaticBaselines { table }
    }

    /// Convenience constructor from `(region, season, value)` triples.
    pub fn from_entries(entries: impl IntoIterator<Item = (RegionId, SeasonId, f64)>) -> Self {
        StaticBaselines {
            table: BaselineTable::new(
                entries
                    .into_iter()
                    .map(|(region, season, value)| BaselineEntry { region, season, value })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl BaselineSource for StaticBaselines {
    async fn baseline(&self, region: RegionId, season: SeasonId) -> DataResult<f64> {
        self.table
            .get(region, season)
            .ok_or(DataError::BaselineMissing { region, season })
    }
}

/// Supplier of the raw reference table for [`RefreshingBaselines`].
#[async_trait]
pub trait BaselineTableProvider: Send + Sync {
    async fn fetch_table(&self) -> DataResult<BaselineTable>;
}

/// Provider-backed source that refreshes its table when a requested season
/// is not covered.
pub struct RefreshingBaselines {
    provider: Arc<dyn BaselineTableProvider>,
    table: RwLock<BaselineTable>,
}

impl RefreshingBaselines {
    pub fn new(provider: Arc<dyn BaselineTableProvider>) -> Self {
        RefreshingBaselines { provider, table: RwLock::new(BaselineTable::default()) }
    }
}

#[async_trait]
impl BaselineSource for RefreshingBaselines {
    async fn baseline(&self, region: RegionId, season: SeasonId) -> DataResult<f64> {
        {
            let table = self.table.read().await;
            if let Some(value) = table.get(region, season) {
                return Ok(value);
            }
            if table.covers_season(season) {
                return Err(DataError::BaselineMissing { region, season });
            }
        }

        info!("baseline table does not cover season {}, refreshing", season);
        let fresh = self.provider.fetch_table().await?;
        let mut table = self.table.write().await;
        *table = fresh;
        table
            .get(region, season)
            .ok_or(DataError::BaselineMissing { region, season })
    }
}
