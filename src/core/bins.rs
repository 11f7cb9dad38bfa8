//! Operations over ordered bin collections.
//!
//! A forecast distribution for one (region, target) pair is an ordered
//! `Vec<Bin>`: non-overlapping half-open intervals covering the target's
//! domain, plus at most one trailing non-occurrence bin for the onset-week
//! target. The lookup tie-break rules here are part of the challenge
//! protocol; scores depend on exact bin selection at boundaries, so the
//! boundary handling must not be "cleaned up".

use std::cmp::Ordering;

use crate::core::domain::{Bin, TargetId, TargetType};
use crate::core::error::{BinError, BinResult};
use crate::time::compare_week_values;

/// Absolute tolerance for bin boundary comparisons.
pub const TOLERANCE: f64 = 1e-9;

/// Single-precision epsilon, used for probability-mass comparisons.
pub const FLT_EPSILON: f64 = f32::EPSILON as f64;

/// Tolerance-aware equality: absolute within `tol`, or relative within
/// `tol` of the smaller magnitude.
pub(crate) fn almost_eq(a: f64, b: f64, tol: f64) -> bool {
    let d = (a - b).abs();
    d <= tol || d <= tol * a.abs().min(b.abs())
}

/// Sort bins for the given target.
///
/// For the onset-week target the single non-occurrence bin is extracted
/// first and re-appended after sorting, so it always ends up last. The
/// remaining bins sort ascending by start: numeric for percent targets,
/// season-relative (week 30 first) for week targets.
///
/// # Errors
///
/// `BinError::MalformedBins` if more than one non-occurrence bin is
/// present, or one is present for a target other than onset-week.
pub fn sort_bins(mut bins: Vec<Bin>, target: TargetId) -> BinResult<Vec<Bin>> {
    let none_count = bins.iter().filter(|b| b.is_none_bin()).count();
    if none_count > 1 {
        return Err(BinError::MalformedBins(
            "more than one non-occurrence bin".to_string(),
        ));
    }
    if none_count == 1 && target != TargetId::OnsetWeek {
        return Err(BinError::MalformedBins(format!(
            "non-occurrence bin not allowed for target {}",
            target
        )));
    }

    let none_bin = bins
        .iter()
        .position(|b| b.is_none_bin())
        .map(|idx| bins.remove(idx));

    let compare = |a: &Bin, b: &Bin| match (a.start(), b.start()) {
        (Some(x), Some(y)) => match target.target_type() {
            TargetType::Percent => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            TargetType::Week => compare_week_values(x, y),
        },
        _ => Ordering::Equal,
    };
    bins.sort_by(compare);

    if let Some(none_bin) = none_bin {
        bins.push(none_bin);
    }
    Ok(bins)
}

/// Index of the bin containing `value`. Assumes bins are properly sorted.
///
/// `value` is `None` for the non-occurrence marker, in which case the last
/// bin must be the non-occurrence bin. Week values are truncated to whole
/// weeks and matched against bin starts by tolerance equality (raw
/// season-relative values are resolved to absolute epiweeks before they
/// reach a bin set; see `time::week_to_epiweek`). Percent values outside
/// the covered range are rejected; a value tolerance-equal to a bin's
/// exclusive end belongs to the following bin.
pub fn find_bin_index(bins: &[Bin], value: Option<f64>, target: TargetId) -> BinResult<usize> {
    let Some(value) = value else {
        // A missing value points at the non-occurrence bin
        return match bins.last() {
            Some(bin) if bin.is_none_bin() => Ok(bins.len() - 1),
            _ => Err(BinError::NotFound),
        };
    };

    match target.target_type() {
        TargetType::Week => {
            // whole weeks only
            let value = value.floor();
            bins.iter()
                .position(|b| {
                    b.start()
                        .is_some_and(|start| almost_eq(start, value, TOLERANCE))
                })
                .ok_or(BinError::NotFound)
        }
        TargetType::Percent => {
            let Some(bin_min) = bins.first().and_then(Bin::start) else {
                return Err(BinError::NotFound);
            };
            let Some(bin_max) = bins.iter().rev().find_map(Bin::end) else {
                return Err(BinError::NotFound);
            };

            if value - (bin_min - TOLERANCE) < 0.0 || value - (bin_max + TOLERANCE) > 0.0 {
                return Err(BinError::NotFound);
            }

            for (idx, bin) in bins.iter().enumerate() {
                let Some(end) = bin.end() else { continue };
                if almost_eq(end, value, TOLERANCE) {
                    // sits on this bin's exclusive end, so the next bin owns it
                    continue;
                }
                if end - (value - TOLERANCE) > 0.0 || almost_eq(end, value - TOLERANCE, TOLERANCE) {
                    return Ok(idx);
                }
            }
            Err(BinError::NotFound)
        }
    }
}

/// Bin containing `value`. Assumes bins are properly sorted.
pub fn find_bin<'a>(bins: &'a [Bin], value: Option<f64>, target: TargetId) -> BinResult<&'a Bin> {
    find_bin_index(bins, value, target).map(|idx| &bins[idx])
}

/// Tell whether the bins represent a uniform distribution.
///
/// The last bin is skipped since it often covers a catch-all range (e.g.
/// all incidence values from 13 to 100) with a different mass.
pub fn is_uniform(bins: &[Bin]) -> bool {
    let Some(first) = bins.first() else { return true };
    bins[..bins.len() - 1]
        .iter()
        .all(|b| almost_eq(b.probability(), first.probability(), FLT_EPSILON))
}

/// Infer the point estimate implied by a distribution.
///
/// A uniform distribution points at the start of the middle bin; otherwise
/// the start of the first bin with maximal probability. `None` when the
/// chosen bin is the non-occurrence bin (or the set is empty).
pub fn infer_point(bins: &[Bin]) -> Option<f64> {
    if bins.is_empty() {
        return None;
    }
    if is_uniform(bins) {
        return bins[bins.len() / 2].start();
    }
    bins.iter()
        .fold(&bins[0], |acc, bin| {
            if acc.probability() < bin.probability() {
                bin
            } else {
                acc
            }
        })
        .start()
}

/// Neighbouring bins considered equivalent to the bin at `index` for
/// multi-bin scoring, per the challenge guideline.
///
/// Week targets use a one-bin window, except the non-occurrence bin which
/// has no neighbours. Percent targets use a five-bin window, reduced to one
/// for the legacy 27-bin coarse binning. Windows clip at the edges.
pub fn expand_bin<'a>(bins: &'a [Bin], index: usize, target: TargetId) -> &'a [Bin] {
    if index >= bins.len() {
        return &[];
    }

    let window = |radius: usize| {
        let lo = index.saturating_sub(radius);
        let hi = (index + radius).min(bins.len() - 1);
        &bins[lo..=hi]
    };

    match target.target_type() {
        TargetType::Week => {
            if bins[index].is_none_bin() {
                &bins[index..=index]
            } else {
                window(1)
            }
        }
        TargetType::Percent => {
            if bins.len() == 27 {
                // legacy coarse binning
                window(1)
            } else {
                window(5)
            }
        }
    }
}

/// Reduce bins by summing probabilities over consecutive batches.
///
/// Each output bin spans from its batch's first start to its last end and
/// carries the batch's summed probability; the final batch may be shorter.
/// Not meaningful for sets containing a non-occurrence bin.
pub fn slice_sum_bins(bins: &[Bin], batch: usize) -> Vec<Bin> {
    if batch == 0 {
        return bins.to_vec();
    }
    bins.chunks(batch)
        .map(|group| {
            let probability = group.iter().map(Bin::probability).sum();
            match (group.first().and_then(Bin::start), group.last().and_then(Bin::end)) {
                (Some(start), Some(end)) => Bin::Interval { start, end, probability },
                _ => Bin::None { probability },
            }
        })
        .collect()
}

/// Tolerance equality of two bins.
pub fn bins_approx_eq(a: &Bin, b: &Bin) -> bool {
    match (a, b) {
        (
            Bin::Interval { start: s1, end: e1, probability: p1 },
            Bin::Interval { start: s2, end: e2, probability: p2 },
        ) => {
            almost_eq(*s1, *s2, TOLERANCE)
                && almost_eq(*e1, *e2, TOLERANCE)
                && almost_eq(*p1, *p2, TOLERANCE)
        }
        (Bin::None { probability: p1 }, Bin::None { probability: p2 }) => {
            almost_eq(*p1, *p2, TOLERANCE)
        }
        _ => false,
    }
}

/// Low and high boundaries trimming `(100 - ci_percent) / 2` percent of
/// probability mass off each tail.
pub fn confidence_range(bins: &[Bin], ci_percent: f64) -> (Option<f64>, Option<f64>) {
    let trim = 0.5 - ci_percent / 200.0;

    let mut acc_low = 0.0;
    let mut acc_high = 0.0;
    let mut low = None;
    let mut high = None;

    for i in 0..bins.len() {
        let mirror = bins.len() - 1 - i;
        acc_low += bins[i].probability();
        acc_high += bins[mirror].probability();

        if acc_low > trim && low.is_none() {
            low = bins[i].start();
        }
        if acc_high > trim && high.is_none() {
            high = bins[mirror].end();
        }
    }

    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Evenly spaced percent bins of the given width with the given masses.
    fn percent_bins(width: f64, probabilities: &[f64]) -> Vec<Bin> {
        probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| Bin::interval(i as f64 * width, (i + 1) as f64 * width, p))
            .collect()
    }

    #[test]
    fn sort_percent_bins() {
        let bins = vec![
            Bin::interval(0.2, 0.3, 0.3),
            Bin::interval(0.0, 0.1, 0.1),
            Bin::interval(0.1, 0.2, 0.6),
        ];
        let sorted = sort_bins(bins, TargetId::WeekAhead1).unwrap();
        assert_eq!(sorted[0].start(), Some(0.0));
        assert_eq!(sorted[1].start(), Some(0.1));
        assert_eq!(sorted[2].start(), Some(0.2));
    }

    #[test]
    fn sort_week_bins_season_relative() {
        // Raw season-relative starts: weeks >= 30 come before weeks < 30
        let bins = vec![
            Bin::interval(2.0, 3.0, 0.25),
            Bin::interval(50.0, 51.0, 0.25),
            Bin::interval(1.0, 2.0, 0.25),
            Bin::interval(40.0, 41.0, 0.25),
        ];
        let sorted = sort_bins(bins, TargetId::PeakWeek).unwrap();
        let starts: Vec<f64> = sorted.iter().filter_map(Bin::start).collect();
        assert_eq!(starts, vec![40.0, 50.0, 1.0, 2.0]);
    }

    #[test]
    fn sort_places_none_bin_last() {
        let bins = vec![
            Bin::interval(201750.0, 201751.0, 0.4),
            Bin::none(0.2),
            Bin::interval(201749.0, 201750.0, 0.4),
        ];
        let sorted = sort_bins(bins, TargetId::OnsetWeek).unwrap();
        assert!(sorted[2].is_none_bin());
        assert_eq!(sorted[0].start(), Some(201749.0));
    }

    #[test]
    fn sort_rejects_duplicate_none_bins() {
        let bins = vec![Bin::none(0.1), Bin::interval(201750.0, 201751.0, 0.8), Bin::none(0.1)];
        assert!(matches!(
            sort_bins(bins, TargetId::OnsetWeek),
            Err(BinError::MalformedBins(_))
        ));
    }

    #[test]
    fn sort_rejects_none_bin_for_percent_target() {
        let bins = vec![Bin::interval(0.0, 0.1, 0.9), Bin::none(0.1)];
        assert!(matches!(
            sort_bins(bins, TargetId::Peak),
            Err(BinError::MalformedBins(_))
        ));
    }

    #[test]
    fn find_percent_normal_cases() {
        let bins = percent_bins(0.1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let target = TargetId::WeekAhead1;

        assert_eq!(find_bin(&bins, Some(0.01), target).unwrap().probability(), 1.0);
        assert_eq!(find_bin(&bins, Some(0.23), target).unwrap().probability(), 3.0);
        assert_eq!(find_bin(&bins, Some(0.43), target).unwrap().probability(), 5.0);
    }

    #[test]
    fn find_percent_edge_cases() {
        let bins = percent_bins(0.1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let target = TargetId::WeekAhead1;

        assert_eq!(find_bin(&bins, Some(0.0), target).unwrap().probability(), 1.0);
        assert_eq!(find_bin(&bins, Some(0.1), target).unwrap().probability(), 2.0);
        assert_eq!(find_bin(&bins, Some(0.4), target).unwrap().probability(), 5.0);
        assert_eq!(find_bin_index(&bins, Some(0.5), target), Err(BinError::NotFound));
        assert_eq!(find_bin_index(&bins, Some(-0.2), target), Err(BinError::NotFound));
    }

    #[test]
    fn find_week_normal_cases() {
        let bins = vec![
            Bin::interval(201450.0, 201451.0, 1.0),
            Bin::interval(201451.0, 201452.0, 2.0),
            Bin::interval(201452.0, 201453.0, 3.0),
        ];
        let target = TargetId::OnsetWeek;

        assert_eq!(find_bin(&bins, Some(201450.0), target).unwrap().probability(), 1.0);
        assert_eq!(find_bin(&bins, Some(201451.0), target).unwrap().probability(), 2.0);
        assert_eq!(find_bin(&bins, Some(201452.0), target).unwrap().probability(), 3.0);
        assert_eq!(find_bin_index(&bins, Some(201453.0), target), Err(BinError::NotFound));
        assert_eq!(find_bin_index(&bins, Some(201449.0), target), Err(BinError::NotFound));
    }

    #[test]
    fn find_week_across_season_boundary() {
        // Regular 52-week season
        let bins = vec![
            Bin::interval(201750.0, 201751.0, 1.0),
            Bin::interval(201751.0, 201752.0, 2.0),
            Bin::interval(201752.0, 201801.0, 3.0),
            Bin::interval(201801.0, 201802.0, 4.0),
            Bin::interval(201802.0, 201803.0, 5.0),
        ];
        let target = TargetId::OnsetWeek;

        assert_eq!(find_bin(&bins, Some(201752.0), target).unwrap().probability(), 3.0);
        assert_eq!(find_bin(&bins, Some(201801.0), target).unwrap().probability(), 4.0);
        assert_eq!(find_bin_index(&bins, Some(201753.0), target), Err(BinError::NotFound));

        // 53-week season
        let bins = vec![
            Bin::interval(201450.0, 201451.0, 1.0),
            Bin::interval(201451.0, 201452.0, 2.0),
            Bin::interval(201452.0, 201453.0, 3.0),
            Bin::interval(201453.0, 201501.0, 4.0),
            Bin::interval(201501.0, 201502.0, 5.0),
            Bin::interval(201502.0, 201503.0, 6.0),
        ];
        assert_eq!(find_bin(&bins, Some(201452.0), target).unwrap().probability(), 3.0);
        assert_eq!(find_bin(&bins, Some(201453.0), target).unwrap().probability(), 4.0);
        assert_eq!(find_bin(&bins, Some(201501.0), target).unwrap().probability(), 5.0);
        assert_eq!(find_bin_index(&bins, Some(201454.0), target), Err(BinError::NotFound));
    }

    #[test]
    fn find_week_truncates_fractional_values() {
        let bins = vec![
            Bin::interval(201750.0, 201751.0, 1.0),
            Bin::interval(201751.0, 201752.0, 2.0),
        ];
        assert_eq!(
            find_bin(&bins, Some(201751.7), TargetId::PeakWeek).unwrap().probability(),
            2.0
        );
    }

    #[test]
    fn find_none_marker() {
        let target = TargetId::OnsetWeek;

        // Non-occurrence bin at the standard position
        let bins = vec![
            Bin::interval(201450.0, 201451.0, 1.0),
            Bin::interval(201451.0, 201452.0, 2.0),
            Bin::interval(201452.0, 201453.0, 3.0),
            Bin::none(4.0),
        ];
        assert_eq!(find_bin(&bins, None, target).unwrap().probability(), 4.0);

        // Non-occurrence bin at a non-standard position
        let bins = vec![
            Bin::interval(201450.0, 201451.0, 1.0),
            Bin::interval(201451.0, 201452.0, 2.0),
            Bin::none(3.0),
            Bin::interval(201452.0, 201453.0, 4.0),
        ];
        assert_eq!(find_bin_index(&bins, None, target), Err(BinError::NotFound));
    }

    #[test]
    fn infer_point_uniform_takes_middle() {
        let bins = percent_bins(0.5, &[0.2, 0.2, 0.2, 0.2, 0.2]);
        assert_eq!(infer_point(&bins), Some(1.0));
    }

    #[test]
    fn infer_point_uniform_ignores_last_bin() {
        // Catch-all last bin with different mass still counts as uniform
        let bins = percent_bins(0.5, &[0.24, 0.24, 0.24, 0.24, 0.04]);
        assert_eq!(infer_point(&bins), Some(1.0));
    }

    #[test]
    fn infer_point_takes_first_maximum() {
        let bins = percent_bins(0.5, &[0.1, 0.3, 0.2, 0.3, 0.1]);
        assert_eq!(infer_point(&bins), Some(0.5));
    }

    #[test]
    fn infer_point_none_bin_maximum() {
        let bins = vec![
            Bin::interval(201450.0, 201451.0, 0.2),
            Bin::interval(201451.0, 201452.0, 0.3),
            Bin::none(0.5),
        ];
        assert_eq!(infer_point(&bins), None);
    }

    #[test]
    fn expand_percent_window() {
        let bins = percent_bins(0.1, &[0.0; 11].map(|_| 1.0 / 11.0));
        // Radius 5 from the middle reaches everything
        assert_eq!(expand_bin(&bins, 5, TargetId::Peak).len(), 11);
        // Clipped at the low edge: indices 0..=6
        let window = expand_bin(&bins, 1, TargetId::Peak);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].start(), Some(0.0));
    }

    #[test]
    fn expand_legacy_27_bin_window() {
        let probabilities = vec![1.0 / 27.0; 27];
        let bins = percent_bins(0.5, &probabilities);
        assert_eq!(expand_bin(&bins, 13, TargetId::Peak).len(), 3);
        assert_eq!(expand_bin(&bins, 0, TargetId::Peak).len(), 2);
    }

    #[test]
    fn expand_week_window() {
        let bins = vec![
            Bin::interval(201750.0, 201751.0, 0.3),
            Bin::interval(201751.0, 201752.0, 0.3),
            Bin::interval(201752.0, 201801.0, 0.2),
            Bin::none(0.2),
        ];
        assert_eq!(expand_bin(&bins, 1, TargetId::OnsetWeek).len(), 3);
        assert_eq!(expand_bin(&bins, 0, TargetId::OnsetWeek).len(), 2);
        // The non-occurrence bin has no neighbours
        let window = expand_bin(&bins, 3, TargetId::OnsetWeek);
        assert_eq!(window.len(), 1);
        assert!(window[0].is_none_bin());
    }

    #[test]
    fn slice_sum_boundaries() {
        let bins = percent_bins(5.0, &[1.0 / 12.0; 12]);
        let sliced = slice_sum_bins(&bins, 5);
        let starts: Vec<f64> = sliced.iter().filter_map(Bin::start).collect();
        let ends: Vec<f64> = sliced.iter().filter_map(Bin::end).collect();
        assert_eq!(starts, vec![0.0, 25.0, 50.0]);
        assert_eq!(ends, vec![25.0, 50.0, 60.0]);
    }

    #[test]
    fn bins_equality_tolerance() {
        let a = Bin::interval(0.1, 0.2, 0.3);
        let b = Bin::interval(0.1 + 1e-12, 0.2, 0.3 - 1e-12);
        assert!(bins_approx_eq(&a, &b));
        assert!(bins_approx_eq(&Bin::none(0.5), &Bin::none(0.5)));
        assert!(!bins_approx_eq(&a, &Bin::none(0.3)));
        assert!(!bins_approx_eq(&a, &Bin::interval(0.1, 0.2, 0.4)));
    }

    #[test]
    fn confidence_range_symmetric_distribution() {
        let bins = percent_bins(1.0, &[0.05, 0.2, 0.5, 0.2, 0.05]);
        let (low, high) = confidence_range(&bins, 90.0);
        assert_eq!(low, Some(1.0));
        assert_eq!(high, Some(4.0));
    }

    proptest! {
        #[test]
        fn random_bins_sum_to_one(weights in proptest::collection::vec(0.01f64..1.0, 2..130)) {
            let total: f64 = weights.iter().sum();
            let probabilities: Vec<f64> = weights.iter().map(|w| w / total).collect();
            let bins = percent_bins(5.0, &probabilities);
            let sum: f64 = bins.iter().map(Bin::probability).sum();
            prop_assert!((sum - 1.0).abs() < 1e-7);
        }

        #[test]
        fn slice_sum_preserves_mass_and_count(
            weights in proptest::collection::vec(0.01f64..1.0, 2..130),
            batch in 1usize..10,
        ) {
            let total: f64 = weights.iter().sum();
            let probabilities: Vec<f64> = weights.iter().map(|w| w / total).collect();
            let bins = percent_bins(5.0, &probabilities);

            let sliced = slice_sum_bins(&bins, batch);
            let sum: f64 = sliced.iter().map(Bin::probability).sum();
            prop_assert!((sum - 1.0).abs() < 1e-7);
            prop_assert_eq!(sliced.len(), bins.len().div_ceil(batch));
        }

        #[test]
        fn locate_roundtrips_interior_values(
            len in 2usize..40,
            idx_seed in 0usize..40,
            frac in 0.05f64..0.95,
        ) {
            let probabilities = vec![1.0 / len as f64; len];
            let bins = percent_bins(0.5, &probabilities);
            let idx = idx_seed % len;
            let value = idx as f64 * 0.5 + frac * 0.5;
            prop_assert_eq!(
                find_bin_index(&bins, Some(value), TargetId::WeekAhead2).unwrap(),
                idx
            );
        }
    }

    #[test]
    fn slice_sum_count_concrete() {
        let bins = percent_bins(5.0, &vec![1.0 / 102.0; 102]);
        assert_eq!(slice_sum_bins(&bins, 5).len(), 21);
    }
}
