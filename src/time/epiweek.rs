//! Epidemiological week arithmetic.
//!
//! Weeks follow the MMWR surveillance calendar: weeks start on Sunday and
//! week 1 of a year is the week containing January 4th. A season spans week
//! 30 of its starting year through week 29 of the next year, so a season has
//! 52 or 53 weeks depending on the starting year.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Season identifier: the starting year of a season. Season `2017` covers
/// week 30 of 2017 through week 29 of 2018.
pub type SeasonId = i32;

/// An absolute epidemiological week, encoded as `year * 100 + week`.
///
/// # Examples
///
/// ```
/// use flucast::time::Epiweek;
///
/// let ew = Epiweek::new(2017, 45);
/// assert_eq!(ew.value(), 201745);
/// assert_eq!(ew.year(), 2017);
/// assert_eq!(ew.week(), 45);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epiweek(u32);

impl Epiweek {
    /// Build an epiweek from a year and a week number.
    pub fn new(year: i32, week: u32) -> Self {
        Epiweek(year as u32 * 100 + week)
    }

    /// Build an epiweek from its `yyyyww` encoding.
    pub fn from_value(value: u32) -> Self {
        Epiweek(value)
    }

    /// The `yyyyww` encoding.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Calendar year component.
    pub fn year(self) -> i32 {
        (self.0 / 100) as i32
    }

    /// Week-of-year component.
    pub fn week(self) -> u32 {
        self.0 % 100
    }
}

impl fmt::Display for Epiweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First day (Sunday) of MMWR week 1 of the given year.
fn year_start(year: i32) -> NaiveDate {
    // Week 1 contains January 4th; step back to that week's Sunday.
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4).unwrap_or_default();
    jan4 - Duration::days(jan4.weekday().num_days_from_sunday() as i64)
}

/// Number of MMWR weeks in the given year (52 or 53).
pub fn weeks_in_year(year: i32) -> u32 {
    ((year_start(year + 1) - year_start(year)).num_days() / 7) as u32
}

/// Number of weeks in the given season, fixed by its starting year.
pub fn weeks_in_season(season: SeasonId) -> u32 {
    weeks_in_year(season)
}

/// Season the given epiweek belongs to. Weeks 30 and later fall in the
/// season starting that year, earlier weeks in the previous one.
pub fn season_of(epiweek: Epiweek) -> SeasonId {
    if epiweek.week() >= 30 {
        epiweek.year()
    } else {
        epiweek.year() - 1
    }
}

/// All epiweeks of a season in chronological order: week 30 of the starting
/// year through week 29 of the next.
///
/// # Examples
///
/// ```
/// use flucast::time::{season_weeks, Epiweek};
///
/// let weeks = season_weeks(2017);
/// assert_eq!(weeks.len(), 52);
/// assert_eq!(weeks[0], Epiweek::new(2017, 30));
/// assert_eq!(*weeks.last().unwrap(), Epiweek::new(2018, 29));
/// ```
pub fn season_weeks(season: SeasonId) -> Vec<Epiweek> {
    let max_week = weeks_in_season(season);
    (30..=max_week)
        .map(|w| Epiweek::new(season, w))
        .chain((1..=29).map(|w| Epiweek::new(season + 1, w)))
        .collect()
}

/// Date of the first day (Sunday) of the given epiweek.
fn epiweek_start(epiweek: Epiweek) -> NaiveDate {
    year_start(epiweek.year()) + Duration::weeks(epiweek.week() as i64 - 1)
}

/// Epiweek containing the given date.
fn epiweek_of_date(date: NaiveDate) -> Epiweek {
    let mut year = date.year();
    if date < year_start(year) {
        year -= 1;
    } else if date >= year_start(year + 1) {
        year += 1;
    }
    let week = ((date - year_start(year)).num_days() / 7) as u32 + 1;
    Epiweek::new(year, week)
}

/// Advance an epiweek by `n` calendar weeks (negative to go back), crossing
/// year boundaries and 53-week years correctly.
pub fn add_weeks(epiweek: Epiweek, n: i64) -> Epiweek {
    epiweek_of_date(epiweek_start(epiweek) + Duration::weeks(n))
}

/// Signed number of calendar weeks from `b` to `a` (`a - b` in week units).
pub fn diff_weeks(a: Epiweek, b: Epiweek) -> i64 {
    (epiweek_start(a) - epiweek_start(b)).num_days() / 7
}

/// Order two season-relative week-typed bin boundaries: every value at or
/// past week 30 sorts before every value under 30, numeric within each half.
/// Distinct from [`diff_weeks`], which compares absolute epiweeks.
pub fn compare_week_values(a: f64, b: f64) -> Ordering {
    if a >= 30.0 && b < 30.0 {
        Ordering::Less
    } else if a < 30.0 && b >= 30.0 {
        Ordering::Greater
    } else {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}

/// Resolve a raw season-relative week number to an absolute epiweek.
///
/// Handles the non-standard values submissions contain: fractional weeks are
/// truncated, values past the season length wrap around modulo the season
/// length, and 0 maps to the season's last week. Non-finite input stands for
/// the non-occurrence marker and resolves to `None`.
///
/// # Examples
///
/// ```
/// use flucast::time::{week_to_epiweek, Epiweek};
///
/// assert_eq!(week_to_epiweek(50.0, 2017), Some(Epiweek::from_value(201750)));
/// assert_eq!(week_to_epiweek(2.0, 2017), Some(Epiweek::from_value(201802)));
/// assert_eq!(week_to_epiweek(0.1, 2017), Some(Epiweek::from_value(201752)));
/// assert_eq!(week_to_epiweek(f64::NAN, 2017), None);
/// ```
pub fn week_to_epiweek(week: f64, season: SeasonId) -> Option<Epiweek> {
    if !week.is_finite() {
        return None;
    }

    let mut week = week.floor() as i64;
    let n_weeks = weeks_in_season(season) as i64;

    if week > n_weeks {
        week %= n_weeks;
    }

    if week == 0 {
        // Wrap back to the final week of the season's starting year.
        Some(Epiweek::new(season, n_weeks as u32))
    } else if week >= 30 {
        Some(Epiweek::new(season, week as u32))
    } else {
        Some(Epiweek::new(season + 1, week as u32))
    }
}

/// Epiweek containing today's date.
pub fn current_epiweek() -> Epiweek {
    epiweek_of_date(Utc::now().date_naive())
}

/// Season containing today's date.
pub fn current_season() -> SeasonId {
    season_of(current_epiweek())
}
