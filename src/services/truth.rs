//! Ground-truth reconstruction from incidence observations.
//!
//! Truth for the week-ahead targets varies per epiweek; peak, peak week and
//! onset are season-level facts repeated on every record of the season.
//! Peak values are only reported once the season's observations are
//! complete, onset once a three-week run at or above the baseline has
//! occurred.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinSet;

use crate::core::domain::{IncidenceSeries, RegionId, Truth};
use crate::core::table::RegionTable;
use crate::data::cache::{Cache, CacheKey};
use crate::data::provider::{rows_to_series, IncidenceProvider, IncidenceRow};
use crate::time::{add_weeks, current_epiweek, season_weeks, Epiweek, SeasonId};

/// Truth records for every epiweek of a season, per region.
pub type SeasonTruth = RegionTable<Vec<Truth>>;

/// Derive the five target truths for every week of a season, for one region.
///
/// `baseline` is the region's epidemic threshold for the season; without
/// one, onset stays unknown. Peak and peak week require the full season to
/// be observed; the earliest week wins a tied peak. Onset is the first week
/// of the first run of at least three consecutive weeks at or above the
/// baseline; a week with no observation breaks a run.
pub fn derive_truth(
    series: &IncidenceSeries,
    season: SeasonId,
    baseline: Option<f64>,
) -> Vec<Truth> {
    let weeks = season_weeks(season);

    let observed: Vec<(Epiweek, f64)> = weeks
        .iter()
        .filter_map(|&w| series.value_at(w).map(|v| (w, v)))
        .collect();
    let complete = observed.len() == weeks.len();

    let (peak, peak_week) = if complete {
        let mut best: Option<(Epiweek, f64)> = None;
        for &(week, value) in &observed {
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((week, value));
            }
        }
        match best {
            Some((week, value)) => (Some(value), Some(week.value() as f64)),
            None => (None, None),
        }
    } else {
        (None, None)
    };

    let onset = baseline.and_then(|baseline| {
        let mut run_start: Option<Epiweek> = None;
        let mut run_length = 0;
        for &week in &weeks {
            if series.value_at(week).is_some_and(|v| v >= baseline) {
                if run_length == 0 {
                    run_start = Some(week);
                }
                run_length += 1;
                if run_length == 3 {
                    return run_start.map(|w| w.value() as f64);
                }
            } else {
                run_start = None;
                run_length = 0;
            }
        }
        None
    });

    weeks
        .into_iter()
        .map(|week| Truth {
            epiweek: week,
            week_ahead: [1, 2, 3, 4].map(|n| series.value_at(add_weeks(week, n))),
            peak,
            peak_week,
            onset,
        })
        .collect()
}

/// A season's incidence series at every requested reporting lag.
///
/// Slots are `None` where the fetch failed; the join is all-or-nothing in
/// the sense that every slot has resolved one way or the other.
#[derive(Debug, Clone, Default)]
pub struct SeasonIncidence {
    /// Latest-issue series.
    pub latest: Option<RegionTable<IncidenceSeries>>,
    /// Lag-specific series in the order the lags were configured.
    pub lagged: Vec<(u32, Option<RegionTable<IncidenceSeries>>)>,
}

/// Truth service over injected data collaborators.
///
/// Owns no global state: the cache and providers are constructed once per
/// process and handed in, and tests substitute in-memory doubles.
pub struct TruthService {
    provider: Arc<dyn IncidenceProvider>,
    cache: Arc<dyn Cache>,
    baselines: Arc<dyn crate::data::baseline::BaselineSource>,
    lags: Vec<u32>,
}

impl TruthService {
    pub fn new(
        provider: Arc<dyn IncidenceProvider>,
        cache: Arc<dyn Cache>,
        baselines: Arc<dyn crate::data::baseline::BaselineSource>,
    ) -> Self {
        TruthService { provider, cache, baselines, lags: Vec::new() }
    }

    /// Also fetch the season at these reporting lags.
    pub fn with_lags(mut self, lags: Vec<u32>) -> Self {
        self.lags = lags;
        self
    }

    /// Remote-backed service per the given configuration, with the supplied
    /// baseline source.
    pub fn with_remote(
        config: &crate::config::Config,
        baselines: Arc<dyn crate::data::baseline::BaselineSource>,
    ) -> anyhow::Result<Self> {
        let provider = crate::data::provider::EpidataClient::new(config.api_root.clone())?;
        let cache = crate::data::cache::FileCache::new(config.cache_dir.clone());
        Ok(TruthService::new(Arc::new(provider), Arc::new(cache), baselines)
            .with_lags(config.lags.clone()))
    }

    /// Fetch the season at the latest issue and at every configured lag.
    ///
    /// The fetches are independent and issued concurrently; a failed fetch
    /// resolves its slot to `None` instead of aborting the others.
    pub async fn season_incidence(&self, season: SeasonId) -> SeasonIncidence {
        let mut tasks = JoinSet::new();
        for lag in std::iter::once(None).chain(self.lags.iter().copied().map(Some)) {
            let provider = Arc::clone(&self.provider);
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move {
                (lag, fetch_season_series(provider, cache, season, lag).await)
            });
        }

        let mut incidence = SeasonIncidence {
            latest: None,
            lagged: self.lags.iter().map(|&lag| (lag, None)).collect(),
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((None, series)) => incidence.latest = series,
                Ok((Some(lag), series)) => {
                    if let Some(slot) = incidence.lagged.iter_mut().find(|(l, _)| *l == lag) {
                        slot.1 = series;
                    }
                }
                Err(e) => warn!("season fetch task failed: {}", e),
            }
        }
        incidence
    }

    /// Truth records for every week of the season, per region.
    ///
    /// Data failures degrade to null truth fields rather than erroring: a
    /// missing season leaves every record empty-valued, a missing baseline
    /// leaves onset unknown for its region.
    pub async fn season_truth(&self, season: SeasonId) -> SeasonTruth {
        let incidence = self.season_incidence(season).await;
        let latest = incidence.latest.unwrap_or_default();

        let mut truth: SeasonTruth = RegionTable::new();
        for region in RegionId::ALL {
            let baseline = match self.baselines.baseline(region, season).await {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("no baseline for {} in season {}: {}", region, season, e);
                    None
                }
            };
            truth.set(region, derive_truth(latest.get(region), season, baseline));
        }
        truth
    }
}

/// Fetch one (season, lag) payload, going through the cache.
async fn fetch_season_series(
    provider: Arc<dyn IncidenceProvider>,
    cache: Arc<dyn Cache>,
    season: SeasonId,
    lag: Option<u32>,
) -> Option<RegionTable<IncidenceSeries>> {
    let key = CacheKey { season, lag, as_of: current_epiweek() }.to_string();

    let cached = match cache.exists(&key).await {
        Ok(true) => match cache.read(&key).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<IncidenceRow>>(&bytes) {
                Ok(rows) => {
                    debug!("cache hit for {}", key);
                    Some(rows)
                }
                Err(e) => {
                    warn!("discarding undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Err(e) => {
                warn!("failed to read cache entry {}: {}", key, e);
                None
            }
        },
        Ok(false) => None,
        Err(e) => {
            warn!("cache lookup failed for {}: {}", key, e);
            None
        }
    };

    let rows = match cached {
        Some(rows) => rows,
        None => match provider.fetch_season(season, lag).await {
            Ok(rows) => {
                info!("fetched season {} at lag {:?}: {} observations", season, lag, rows.len());
                match serde_json::to_vec(&rows) {
                    Ok(bytes) => {
                        if let Err(e) = cache.write(&key, &bytes).await {
                            warn!("failed to cache {}: {}", key, e);
                        }
                    }
                    Err(e) => warn!("failed to encode payload for {}: {}", key, e),
                }
                rows
            }
            Err(e) => {
                warn!("season {} at lag {:?} unavailable: {}", season, lag, e);
                return None;
            }
        },
    };

    Some(rows_to_series(&rows))
}
