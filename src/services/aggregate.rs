//! Score aggregation across forecasts.

use crate::core::domain::Score;
use crate::core::table::RegionTargetTable;

/// Mean of the non-null values, `None` when every value is null.
fn mean_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let values: Vec<f64> = values.flatten().collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Aggregate per-forecast score tables by taking the mean per cell.
///
/// Null entries are excluded from both sum and count. The signed `error`
/// is always null in the aggregate: averaging signed week/percent errors
/// across forecasts is not a meaningful quantity.
pub fn mean_scores(scores: &[RegionTargetTable<Score>]) -> RegionTargetTable<Score> {
    RegionTargetTable::from_fn(|region, target| {
        let cells = || scores.iter().map(|table| table.get(region, target));
        Score {
            log_score: mean_of(cells().map(|s| s.log_score)),
            multi_bin_log_score: mean_of(cells().map(|s| s.multi_bin_log_score)),
            error: None,
            abs_error: mean_of(cells().map(|s| s.abs_error)),
            probability_score: mean_of(cells().map(|s| s.probability_score)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{RegionId, TargetId};

    fn table_with(region: RegionId, target: TargetId, score: Score) -> RegionTargetTable<Score> {
        let mut table: RegionTargetTable<Score> = RegionTargetTable::new();
        table.set(region, target, score);
        table
    }

    #[test]
    fn means_exclude_nulls() {
        let region = RegionId::Nat;
        let target = TargetId::Peak;
        let a = table_with(
            region,
            target,
            Score {
                log_score: Some(-1.0),
                multi_bin_log_score: Some(-0.5),
                error: Some(-5.0),
                abs_error: Some(5.0),
                probability_score: Some(0.4),
            },
        );
        let b = table_with(
            region,
            target,
            Score {
                log_score: None,
                multi_bin_log_score: Some(-0.3),
                error: Some(1.0),
                abs_error: Some(1.0),
                probability_score: Some(0.6),
            },
        );

        let mean = mean_scores(&[a, b]);
        let cell = mean.get(region, target);

        assert_eq!(cell.abs_error, Some(3.0));
        // Null log score excluded from sum and count
        assert_eq!(cell.log_score, Some(-1.0));
        assert_eq!(cell.multi_bin_log_score, Some(-0.4));
        assert_eq!(cell.probability_score, Some(0.5));
        // Signed error is never aggregated
        assert_eq!(cell.error, None);
    }

    #[test]
    fn all_null_stays_null() {
        let tables = vec![
            RegionTargetTable::<Score>::new(),
            RegionTargetTable::<Score>::new(),
        ];
        let mean = mean_scores(&tables);
        assert_eq!(*mean.get(RegionId::Hhs5, TargetId::OnsetWeek), Score::null());
    }

    #[test]
    fn infinite_scores_propagate() {
        let region = RegionId::Nat;
        let target = TargetId::WeekAhead1;
        let a = table_with(
            region,
            target,
            Score { log_score: Some(f64::NEG_INFINITY), ..Score::null() },
        );
        let b = table_with(region, target, Score { log_score: Some(-1.0), ..Score::null() });

        let mean = mean_scores(&[a, b]);
        assert_eq!(mean.get(region, target).log_score, Some(f64::NEG_INFINITY));
    }
}
