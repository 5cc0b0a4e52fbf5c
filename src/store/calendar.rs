use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};

use crate::config::LeagueSettings;

pub fn to_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_ymd(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {raw}"))
}

/// Rolls a date back to the Monday of its week. Sunday counts as day 7 of
/// the week that started six days earlier.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Monday..Sunday of the week starting at `week_start`.
pub fn week_dates(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|i| week_start + Duration::days(i)).collect()
}

pub fn day_index_for(settings: &LeagueSettings, date: NaiveDate) -> i64 {
    settings.day_index_start + (date - settings.epoch).num_days()
}

pub fn week_index_for(settings: &LeagueSettings, date: NaiveDate) -> i64 {
    let elapsed = (monday_of(date) - monday_of(settings.epoch)).num_days();
    settings.week_index_start + elapsed.div_euclid(7)
}
