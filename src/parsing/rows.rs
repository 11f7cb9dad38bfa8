//! Row shape supplied by the external submission parser, and assembly of
//! normalized forecasts from it.
//!
//! The core never reads delimited text. A parser collaborator hands over,
//! per (region, target), the rows of the submission file already typed and
//! grouped; `assemble_forecast` turns that shape into an immutable
//! [`Forecast`], resolving raw season-relative week values to absolute
//! epiweeks and sorting every bin set.

use crate::core::bins::sort_bins;
use crate::core::domain::{Bin, TargetId, TargetType};
use crate::core::error::{BinError, BinResult};
use crate::core::forecast::{Forecast, ForecastCell};
use crate::core::table::RegionTargetTable;
use crate::time::{season_of, week_to_epiweek, Epiweek, SeasonId};

/// One data row of a submission, tagged by its `type` column.
///
/// `None` values stand for the "none" marker in the file: a non-occurrence
/// point prediction, or the boundaries of the non-occurrence bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawRow {
    Point { value: Option<f64> },
    Bin { start: Option<f64>, end: Option<f64>, probability: f64 },
}

/// Resolve a raw boundary value for the given target type.
///
/// Week boundaries arrive as season-relative week numbers and are mapped to
/// the `yyyyww` encoding; percent boundaries pass through.
fn resolve_boundary(raw: f64, target_type: TargetType, season: SeasonId) -> Option<f64> {
    match target_type {
        TargetType::Percent => Some(raw),
        TargetType::Week => week_to_epiweek(raw, season).map(|e| e.value() as f64),
    }
}

/// Build the sorted bin set of one cell from its bin rows.
fn assemble_bins(rows: &[RawRow], target: TargetId, season: SeasonId) -> BinResult<Vec<Bin>> {
    let target_type = target.target_type();
    let mut bins = Vec::new();

    for row in rows {
        let &RawRow::Bin { start, end, probability } = row else { continue };
        let start = start.and_then(|s| resolve_boundary(s, target_type, season));
        let end = end.and_then(|e| resolve_boundary(e, target_type, season));
        match (start, end) {
            (Some(start), Some(end)) => bins.push(Bin::Interval { start, end, probability }),
            (None, None) => bins.push(Bin::None { probability }),
            _ => {
                return Err(BinError::MalformedBins(format!(
                    "bin for target {} has only one boundary",
                    target
                )))
            }
        }
    }

    sort_bins(bins, target)
}

/// Point estimate of one cell: the first point row, week values resolved to
/// absolute epiweeks.
fn assemble_point(rows: &[RawRow], target_type: TargetType, season: SeasonId) -> Option<f64> {
    rows.iter().find_map(|row| match row {
        RawRow::Point { value } => {
            Some(value.and_then(|v| resolve_boundary(v, target_type, season)))
        }
        RawRow::Bin { .. } => None,
    })?
}

/// Turn grouped raw rows into a normalized, immutable forecast.
///
/// # Errors
///
/// `BinError::MalformedBins` when a cell's bins violate the
/// non-occurrence-bin invariant or carry half-specified boundaries.
pub fn assemble_forecast(
    model: impl Into<String>,
    epiweek: Epiweek,
    rows: &RegionTargetTable<Vec<RawRow>>,
) -> BinResult<Forecast> {
    let season = season_of(epiweek);
    let mut cells: RegionTargetTable<ForecastCell> = RegionTargetTable::new();

    for (region, target, cell_rows) in rows.iter() {
        let bins = assemble_bins(cell_rows, target, season)?;
        let point = assemble_point(cell_rows, target.target_type(), season);
        cells.set(region, target, ForecastCell { bins, point });
    }

    Ok(Forecast::new(model, epiweek, cells))
}
