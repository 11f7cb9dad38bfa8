//! Domain models for forecast scoring.
//!
//! This module defines the closed region and target enumerations used by the
//! forecasting challenge, the tagged bin representation, and the value types
//! flowing between truth derivation, scoring and aggregation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::time::Epiweek;

/// The eleven geographic units forecasts are submitted for: the national
/// aggregate plus the ten HHS surveillance regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionId {
    Nat,
    Hhs1,
    Hhs2,
    Hhs3,
    Hhs4,
    Hhs5,
    Hhs6,
    Hhs7,
    Hhs8,
    Hhs9,
    Hhs10,
}

/// Number of regions in [`RegionId`].
pub const REGION_COUNT: usize = 11;

impl RegionId {
    /// All regions in canonical order.
    pub const ALL: [RegionId; REGION_COUNT] = [
        RegionId::Nat,
        RegionId::Hhs1,
        RegionId::Hhs2,
        RegionId::Hhs3,
        RegionId::Hhs4,
        RegionId::Hhs5,
        RegionId::Hhs6,
        RegionId::Hhs7,
        RegionId::Hhs8,
        RegionId::Hhs9,
        RegionId::Hhs10,
    ];

    /// Position in the canonical order, used for table indexing.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short identifier used in code and API requests.
    pub fn id(self) -> &'static str {
        match self {
            RegionId::Nat => "nat",
            RegionId::Hhs1 => "hhs1",
            RegionId::Hhs2 => "hhs2",
            RegionId::Hhs3 => "hhs3",
            RegionId::Hhs4 => "hhs4",
            RegionId::Hhs5 => "hhs5",
            RegionId::Hhs6 => "hhs6",
            RegionId::Hhs7 => "hhs7",
            RegionId::Hhs8 => "hhs8",
            RegionId::Hhs9 => "hhs9",
            RegionId::Hhs10 => "hhs10",
        }
    }

    /// Full name as written in submission files.
    pub fn full_name(self) -> &'static str {
        match self {
            RegionId::Nat => "US National",
            RegionId::Hhs1 => "HHS Region 1",
            RegionId::Hhs2 => "HHS Region 2",
            RegionId::Hhs3 => "HHS Region 3",
            RegionId::Hhs4 => "HHS Region 4",
            RegionId::Hhs5 => "HHS Region 5",
            RegionId::Hhs6 => "HHS Region 6",
            RegionId::Hhs7 => "HHS Region 7",
            RegionId::Hhs8 => "HHS Region 8",
            RegionId::Hhs9 => "HHS Region 9",
            RegionId::Hhs10 => "HHS Region 10",
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RegionId {
    type Err = String;

    /// Accepts both the short id ("hhs4") and the full name ("HHS Region 4").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionId::ALL
            .into_iter()
            .find(|r| r.id() == s || r.full_name() == s)
            .ok_or_else(|| format!("Unknown region: {}", s))
    }
}

/// Whether a target's bin boundaries are incidence percentages or weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Percent,
    Week,
}

/// The seven forecast targets: four week-ahead incidence horizons, the
/// seasonal peak magnitude, the peak week and the onset week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetId {
    #[serde(rename = "1-ahead")]
    WeekAhead1,
    #[serde(rename = "2-ahead")]
    WeekAhead2,
    #[serde(rename = "3-ahead")]
    WeekAhead3,
    #[serde(rename = "4-ahead")]
    WeekAhead4,
    #[serde(rename = "peak")]
    Peak,
    #[serde(rename = "peak-wk")]
    PeakWeek,
    #[serde(rename = "onset-wk")]
    OnsetWeek,
}

/// Number of targets in [`TargetId`].
pub const TARGET_COUNT: usize = 7;

impl TargetId {
    /// All targets in canonical order.
    pub const ALL: [TargetId; TARGET_COUNT] = [
        TargetId::WeekAhead1,
        TargetId::WeekAhead2,
        TargetId::WeekAhead3,
        TargetId::WeekAhead4,
        TargetId::Peak,
        TargetId::PeakWeek,
        TargetId::OnsetWeek,
    ];

    /// Position in the canonical order, used for table indexing.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short identifier used in code.
    pub fn id(self) -> &'static str {
        match self {
            TargetId::WeekAhead1 => "1-ahead",
            TargetId::WeekAhead2 => "2-ahead",
            TargetId::WeekAhead3 => "3-ahead",
            TargetId::WeekAhead4 => "4-ahead",
            TargetId::Peak => "peak",
            TargetId::PeakWeek => "peak-wk",
            TargetId::OnsetWeek => "onset-wk",
        }
    }

    /// Full name as written in submission files.
    pub fn full_name(self) -> &'static str {
        match self {
            TargetId::WeekAhead1 => "1 wk ahead",
            TargetId::WeekAhead2 => "2 wk ahead",
            TargetId::WeekAhead3 => "3 wk ahead",
            TargetId::WeekAhead4 => "4 wk ahead",
            TargetId::Peak => "Season peak percentage",
            TargetId::PeakWeek => "Season peak week",
            TargetId::OnsetWeek => "Season onset",
        }
    }

    /// The kind of values this target's bins range over.
    pub fn target_type(self) -> TargetType {
        match self {
            TargetId::PeakWeek | TargetId::OnsetWeek => TargetType::Week,
            _ => TargetType::Percent,
        }
    }

    /// Look-ahead horizon in weeks, for the week-ahead targets.
    pub fn horizon(self) -> Option<u32> {
        match self {
            TargetId::WeekAhead1 => Some(1),
            TargetId::WeekAhead2 => Some(2),
            TargetId::WeekAhead3 => Some(3),
            TargetId::WeekAhead4 => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TargetId {
    type Err = String;

    /// Accepts both the short id ("peak-wk") and the full name
    /// ("Season peak week").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetId::ALL
            .into_iter()
            .find(|t| t.id() == s || t.full_name() == s)
            .ok_or_else(|| format!("Unknown target: {}", s))
    }
}

/// One bin of a discretized forecast distribution.
///
/// An `Interval` bin covers `[start, end)`; for week targets the boundaries
/// are absolute epiweeks in `yyyyww` encoding. The `None` bin carries the
/// probability assigned to non-occurrence and is valid only for the
/// onset-week target, where it must sort last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bin {
    Interval { start: f64, end: f64, probability: f64 },
    None { probability: f64 },
}

impl Bin {
    /// Interval bin over `[start, end)`.
    pub fn interval(start: f64, end: f64, probability: f64) -> Self {
        Bin::Interval { start, end, probability }
    }

    /// Non-occurrence bin.
    pub fn none(probability: f64) -> Self {
        Bin::None { probability }
    }

    pub fn probability(&self) -> f64 {
        match *self {
            Bin::Interval { probability, .. } | Bin::None { probability } => probability,
        }
    }

    /// Inclusive lower boundary, absent for the non-occurrence bin.
    pub fn start(&self) -> Option<f64> {
        match *self {
            Bin::Interval { start, .. } => Some(start),
            Bin::None { .. } => None,
        }
    }

    /// Exclusive upper boundary, absent for the non-occurrence bin.
    pub fn end(&self) -> Option<f64> {
        match *self {
            Bin::Interval { end, .. } => Some(end),
            Bin::None { .. } => None,
        }
    }

    pub fn is_none_bin(&self) -> bool {
        matches!(self, Bin::None { .. })
    }
}

/// A single incidence observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidencePoint {
    pub epiweek: Epiweek,
    pub value: f64,
}

/// Ordered incidence observations for one region; may have gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidenceSeries {
    pub points: Vec<IncidencePoint>,
}

impl IncidenceSeries {
    pub fn new(mut points: Vec<IncidencePoint>) -> Self {
        points.sort_by_key(|p| p.epiweek);
        IncidenceSeries { points }
    }

    /// Observed value at the given epiweek, if present.
    pub fn value_at(&self, epiweek: Epiweek) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.epiweek == epiweek)
            .map(|p| p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Ground truth for one (region, epiweek).
///
/// Week-valued truths (`peak_week`, `onset`) hold the epiweek's `yyyyww`
/// encoding as a float, matching the week-bin boundary representation. A
/// `None` onset means no sustained rise occurred (or is known yet); `None`
/// in any other field means the truth cannot be derived from the available
/// observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Truth {
    pub epiweek: Epiweek,
    pub week_ahead: [Option<f64>; 4],
    pub peak: Option<f64>,
    pub peak_week: Option<f64>,
    pub onset: Option<f64>,
}

impl Truth {
    /// Truth value for the given target.
    pub fn value_for(&self, target: TargetId) -> Option<f64> {
        match target {
            TargetId::WeekAhead1 => self.week_ahead[0],
            TargetId::WeekAhead2 => self.week_ahead[1],
            TargetId::WeekAhead3 => self.week_ahead[2],
            TargetId::WeekAhead4 => self.week_ahead[3],
            TargetId::Peak => self.peak,
            TargetId::PeakWeek => self.peak_week,
            TargetId::OnsetWeek => self.onset,
        }
    }
}

/// Scores for one (region, target) of one forecast.
///
/// Score records are values: created fresh per scoring call and never
/// mutated. `None` fields mark scores that are undefined for the forecast
/// (missing truth, unlocatable bin, missing point estimate). The signed
/// `error` uses negative infinity for the maximally-wrong week predictions
/// (a concrete week predicted when the truth is non-occurrence, and the
/// reverse).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Score {
    pub log_score: Option<f64>,
    pub multi_bin_log_score: Option<f64>,
    pub error: Option<f64>,
    pub abs_error: Option<f64>,
    pub probability_score: Option<f64>,
}

impl Score {
    /// The all-null score used when truth is insufficient.
    pub fn null() -> Self {
        Score::default()
    }
}
