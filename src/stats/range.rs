use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};

use crate::store::calendar::to_ymd;
use crate::store::models::{LeagueDay, Store};

/// A day lifted out of its week, carrying the week context along.
#[derive(Debug, Clone)]
pub struct FlatDay {
    pub week_start: String,
    pub week_index: i64,
    pub day: LeagueDay,
}

/// All recorded days with `start <= date <= end`, ascending by date.
pub fn days_in_range(store: &Store, start: &str, end: &str) -> Vec<FlatDay> {
    let mut out: Vec<FlatDay> = Vec::new();

    for week in store.weeks.values() {
        for day in week.days.values() {
            if day.date.as_str() < start || day.date.as_str() > end {
                continue;
            }
            out.push(FlatDay {
                week_start: week.week_start.clone(),
                week_index: week.week_index,
                day: day.clone(),
            });
        }
    }

    out.sort_by(|a, b| a.day.date.cmp(&b.day.date));
    out
}

/// Inclusive first..last day keys of a calendar month.
pub fn month_range(year: i32, month: u32) -> Result<(String, String)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month: {year}-{month}"))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .with_context(|| format!("Month out of range: {year}-{month}"))?;
    Ok((to_ymd(first), to_ymd(last)))
}
