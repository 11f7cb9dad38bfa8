//! Incidence-fetch collaborator and its HTTP implementation.
//!
//! The shipped client talks to a Delphi-style epidata API: one request per
//! (season, lag) covering all weeks of the season and all regions. Only the
//! fields consumed by truth derivation are decoded; the rest of the wire
//! format is not relied upon.

use anyhow::Context;
use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::domain::{IncidencePoint, IncidenceSeries, RegionId};
use crate::core::table::RegionTable;
use crate::data::error::{DataError, DataResult};
use crate::time::{Epiweek, SeasonId};

/// One normalized incidence observation as returned by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidenceRow {
    pub region: RegionId,
    pub epiweek: u32,
    pub value: f64,
}

/// Remote incidence statistics collaborator.
#[async_trait]
pub trait IncidenceProvider: Send + Sync {
    /// Fetch one season of observations for every region, at the given
    /// reporting lag (`None` for the latest issue).
    async fn fetch_season(&self, season: SeasonId, lag: Option<u32>)
        -> DataResult<Vec<IncidenceRow>>;
}

/// Group provider rows into per-region ordered series.
pub fn rows_to_series(rows: &[IncidenceRow]) -> RegionTable<IncidenceSeries> {
    let mut table: RegionTable<Vec<IncidencePoint>> = RegionTable::new();
    for row in rows {
        table.get_mut(row.region).push(IncidencePoint {
            epiweek: Epiweek::from_value(row.epiweek),
            value: row.value,
        });
    }
    RegionTable::from_fn(|region| IncidenceSeries::new(table.get(region).clone()))
}

/// HTTP client for the Delphi epidata API.
pub struct EpidataClient {
    http: reqwest::Client,
    api_root: String,
}

impl EpidataClient {
    pub fn new(api_root: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build http client")?;
        Ok(EpidataClient { http, api_root: api_root.into() })
    }
}

/// Wire shape of an epidata response, limited to the consumed fields.
#[derive(Debug, Deserialize)]
struct EpidataResponse {
    result: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    epidata: Vec<EpidataEntry>,
}

#[derive(Debug, Deserialize)]
struct EpidataEntry {
    region: String,
    epiweek: u32,
    wili: f64,
}

#[async_trait]
impl IncidenceProvider for EpidataClient {
    async fn fetch_season(
        &self,
        season: SeasonId,
        lag: Option<u32>,
    ) -> DataResult<Vec<IncidenceRow>> {
        let regions = RegionId::ALL.map(RegionId::id).join(",");
        let epiweeks = format!("{}-{}", season * 100 + 30, (season + 1) * 100 + 29);

        let mut params = vec![
            ("source", "fluview".to_string()),
            ("epiweeks", epiweeks),
            ("regions", regions),
        ];
        if let Some(lag) = lag {
            params.push(("lag", lag.to_string()));
        }

        let response = self
            .http
            .get(&self.api_root)
            .query(&params)
            .send()
            .await
            .map_err(|e| DataError::RemoteUnavailable(e.to_string()))?;

        let payload: EpidataResponse = response
            .json()
            .await
            .map_err(|e| DataError::Decode(e.to_string()))?;

        if payload.result != 1 {
            return Err(DataError::RemoteUnavailable(payload.message));
        }

        let mut rows = Vec::with_capacity(payload.epidata.len());
        for entry in payload.epidata {
            match entry.region.parse::<RegionId>() {
                Ok(region) => rows.push(IncidenceRow {
                    region,
                    epiweek: entry.epiweek,
                    value: entry.wili,
                }),
                Err(_) => warn!("skipping observation for unknown region {}", entry.region),
            }
        }
        Ok(rows)
    }
}
