//! Forecast sanity checks.
//!
//! Each check aborts validation of the offending forecast with a typed
//! error; none of them mutate or repair the data.

use crate::core::bins::{almost_eq, bins_approx_eq, infer_point, FLT_EPSILON};
use crate::core::domain::{Bin, RegionId, TargetId};
use crate::core::forecast::Forecast;

/// Result type for verification checks.
pub type VerifyResult = Result<(), VerifyError>;

/// Error type for verification checks.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Probability mass error: {0}")]
    ProbabilityMass(String),

    #[error("Point mismatch: {0}")]
    PointMismatch(String),

    #[error("Header mismatch: {0}")]
    HeaderMismatch(String),

    #[error("Forecasts not equivalent: {0}")]
    Equivalence(String),
}

/// The fixed column schema of submission files.
pub const EXPECTED_HEADERS: [&str; 7] = [
    "location",
    "target",
    "type",
    "unit",
    "bin_start_incl",
    "bin_end_notincl",
    "value",
];

/// Check that every probability lies in `[0, 1]` and the set sums to one.
pub fn verify_probability_sum(bins: &[Bin]) -> VerifyResult {
    let mut sum = 0.0;
    for bin in bins {
        let p = bin.probability();
        if !(0.0..=1.0).contains(&p) {
            return Err(VerifyError::ProbabilityMass(format!(
                "probability {} outside [0.0, 1.0]",
                p
            )));
        }
        sum += p;
    }
    if !almost_eq(sum, 1.0, FLT_EPSILON) {
        return Err(VerifyError::ProbabilityMass(format!(
            "probabilities sum to {} instead of 1.0",
            sum
        )));
    }
    Ok(())
}

/// Check that the submitted point estimate matches the one implied by the
/// bins.
pub fn verify_point_consistency(bins: &[Bin], point: Option<f64>) -> VerifyResult {
    let inferred = infer_point(bins);
    match (point, inferred) {
        (None, None) => Ok(()),
        (Some(p), Some(i)) if almost_eq(p, i, FLT_EPSILON) => Ok(()),
        _ => Err(VerifyError::PointMismatch(format!(
            "point {:?} does not match inferred {:?}",
            point, inferred
        ))),
    }
}

/// Check the header row against the expected schema, case-insensitively.
pub fn verify_headers<S: AsRef<str>>(headers: &[S]) -> VerifyResult {
    if headers.len() != EXPECTED_HEADERS.len() {
        return Err(VerifyError::HeaderMismatch(format!(
            "expected {} columns, found {}",
            EXPECTED_HEADERS.len(),
            headers.len()
        )));
    }
    for (found, expected) in headers.iter().zip(EXPECTED_HEADERS) {
        if found.as_ref().to_lowercase() != expected {
            return Err(VerifyError::HeaderMismatch(format!(
                "expected column {:?}, found {:?}",
                expected,
                found.as_ref()
            )));
        }
    }
    Ok(())
}

/// Run probability-mass and point-consistency checks over every cell of a
/// forecast.
pub fn verify_forecast(forecast: &Forecast) -> VerifyResult {
    for region in RegionId::ALL {
        for target in TargetId::ALL {
            let bins = forecast.bins(region, target);
            verify_probability_sum(bins).map_err(|e| {
                VerifyError::ProbabilityMass(format!("{} {}: {}", region, target, e))
            })?;
            verify_point_consistency(bins, forecast.point(region, target)).map_err(|e| {
                VerifyError::PointMismatch(format!("{} {}: {}", region, target, e))
            })?;
        }
    }
    Ok(())
}

/// Check that two forecasts are equivalent: same model and epiweek, exact
/// point matches, and bin-by-bin tolerance equality.
pub fn verify_equivalence(a: &Forecast, b: &Forecast) -> VerifyResult {
    if a.model() != b.model() {
        return Err(VerifyError::Equivalence(format!(
            "models differ: {} vs {}",
            a.model(),
            b.model()
        )));
    }
    if a.epiweek() != b.epiweek() {
        return Err(VerifyError::Equivalence(format!(
            "epiweeks differ: {} vs {}",
            a.epiweek(),
            b.epiweek()
        )));
    }

    for region in RegionId::ALL {
        for target in TargetId::ALL {
            if a.point(region, target) != b.point(region, target) {
                return Err(VerifyError::Equivalence(format!(
                    "point predictions for {} {} differ",
                    region, target
                )));
            }

            let bins_a = a.bins(region, target);
            let bins_b = b.bins(region, target);
            let equal = bins_a.len() == bins_b.len()
                && bins_a
                    .iter()
                    .zip(bins_b)
                    .all(|(x, y)| bins_approx_eq(x, y));
            if !equal {
                return Err(VerifyError::Equivalence(format!(
                    "bins for {} {} differ",
                    region, target
                )));
            }
        }
    }
    Ok(())
}
