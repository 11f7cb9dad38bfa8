//! Per-forecast score computation.
//!
//! Lookup failures never abort a scoring pass: a truth value that cannot be
//! located in the submitted bins leaves the probability-based fields null
//! for that one cell. Predicting a concrete week when the truth is
//! non-occurrence (or the reverse) scores a negative-infinity error, the
//! maximally wrong week prediction.

use crate::core::bins::{expand_bin, find_bin_index};
use crate::core::domain::{Bin, Score, TargetId, TargetType};
use crate::core::forecast::Forecast;
use crate::core::table::RegionTargetTable;
use crate::services::truth::SeasonTruth;
use crate::time::{diff_weeks, Epiweek};

/// Score one (region, target) cell.
///
/// `true_value` is `None` for the non-occurrence truth of the onset-week
/// target; for every other target a `None` truth means insufficient data
/// and yields the all-null score.
pub fn score_cell(
    bins: &[Bin],
    point: Option<f64>,
    true_value: Option<f64>,
    target: TargetId,
) -> Score {
    if target != TargetId::OnsetWeek && true_value.is_none() {
        // Only onset can genuinely have a "none" truth
        return Score::null();
    }

    let located = find_bin_index(bins, true_value, target).ok();
    let probability = located.map(|idx| bins[idx].probability());
    let log_score = probability.map(f64::ln);
    let multi_bin_log_score = located.map(|idx| {
        expand_bin(bins, idx, target)
            .iter()
            .map(Bin::probability)
            .sum::<f64>()
            .ln()
    });

    let error = match target.target_type() {
        TargetType::Percent => match (true_value, point) {
            (Some(truth), Some(point)) => Some(truth - point),
            _ => None,
        },
        TargetType::Week => Some(match (true_value, point) {
            (None, None) => 0.0,
            (None, Some(_)) | (Some(_), None) => f64::NEG_INFINITY,
            (Some(truth), Some(point)) => diff_weeks(
                Epiweek::from_value(truth as u32),
                Epiweek::from_value(point as u32),
            ) as f64,
        }),
    };

    Score {
        log_score,
        multi_bin_log_score,
        error,
        abs_error: error.map(f64::abs),
        probability_score: probability,
    }
}

/// Score every (region, target) cell of a forecast against the season's
/// truth, matched on the forecast's origin epiweek.
pub fn score_forecast(forecast: &Forecast, truth: &SeasonTruth) -> RegionTargetTable<Score> {
    RegionTargetTable::from_fn(|region, target| {
        let record = truth
            .get(region)
            .iter()
            .find(|t| t.epiweek == forecast.epiweek());
        let Some(record) = record else {
            return Score::null();
        };
        score_cell(
            forecast.bins(region, target),
            forecast.point(region, target),
            record.value_for(target),
            target,
        )
    })
}
