//! Parsed-row collaborator boundary.
//!
//! Delimited-text parsing happens outside the crate; this module defines the
//! typed row shape the parser hands over and the assembly of normalized
//! forecasts from it.

pub mod rows;

pub use rows::{assemble_forecast, RawRow};
