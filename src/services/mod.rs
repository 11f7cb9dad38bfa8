//! Service layer: truth reconstruction, scoring, aggregation and
//! verification over the core domain model.

pub mod aggregate;
pub mod scoring;
pub mod truth;
pub mod verify;

pub use aggregate::mean_scores;
pub use scoring::{score_cell, score_forecast};
pub use truth::{derive_truth, SeasonIncidence, SeasonTruth, TruthService};
pub use verify::{
    verify_equivalence, verify_forecast, verify_headers, verify_point_consistency,
    verify_probability_sum, VerifyError, VerifyResult, EXPECTED_HEADERS,
};
