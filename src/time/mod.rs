pub mod epiweek;

// Re-export the calendar surface used throughout the crate
pub use epiweek::{
    add_weeks, compare_week_values, current_epiweek, current_season, diff_weeks, season_of,
    season_weeks, week_to_epiweek, weeks_in_season, weeks_in_year, Epiweek, SeasonId,
};
