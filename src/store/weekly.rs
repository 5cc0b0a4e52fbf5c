use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

use crate::config::LeagueSettings;
use crate::render::{group_thousands, pad_left, pad_right, RenderedTable};

use super::calendar::{day_index_for, parse_ymd, to_ymd, week_dates};
use super::models::{GameMode, GeoId, LeagueWeek, PlayerProfile};

#[derive(Debug, Clone, PartialEq)]
pub struct PodiumRow {
    pub geo_id: GeoId,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestDaily {
    pub geo_id: GeoId,
    pub score: f64,
    pub date: String,
    pub day_index: i64,
}

/// Top 3 players by weekly total. Missing cells contribute nothing; ties
/// keep the stable (id-sorted) order of the underlying scan.
pub fn podium(week: &LeagueWeek) -> Vec<PodiumRow> {
    let mut totals: BTreeMap<&GeoId, f64> = BTreeMap::new();

    for day in week.days.values() {
        for (geo_id, score) in &day.scores {
            if !score.is_finite() {
                continue;
            }
            *totals.entry(geo_id).or_insert(0.0) += score;
        }
    }

    let mut rows: Vec<PodiumRow> = totals
        .into_iter()
        .map(|(geo_id, total)| PodiumRow {
            geo_id: geo_id.clone(),
            total,
        })
        .collect();

    rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    rows.truncate(3);
    rows
}

/// Ids with a score entry on every one of the week's seven dates. A date
/// without a recorded day counts as non-attendance.
pub fn perfect_attendance(week: &LeagueWeek) -> Result<Vec<GeoId>> {
    let monday = parse_ymd(&week.week_start)?;
    let dates: Vec<String> = week_dates(monday).into_iter().map(to_ymd).collect();

    let mut seen: BTreeSet<&GeoId> = BTreeSet::new();
    for date in &dates {
        if let Some(day) = week.days.get(date) {
            seen.extend(day.scores.keys());
        }
    }

    let perfect = seen
        .into_iter()
        .filter(|geo_id| {
            dates.iter().all(|date| {
                week.days
                    .get(date)
                    .is_some_and(|day| day.scores.contains_key(*geo_id))
            })
        })
        .cloned()
        .collect();

    Ok(perfect)
}

pub fn best_daily_by_rounds(week: &LeagueWeek, rounds: u32) -> Option<BestDaily> {
    best_daily(week, |day| day.round_count == Some(rounds))
}

pub fn best_daily_by_rounds_and_mode(
    week: &LeagueWeek,
    rounds: u32,
    mode: GameMode,
) -> Option<BestDaily> {
    best_daily(week, |day| {
        day.round_count == Some(rounds) && day.mode == Some(mode)
    })
}

fn best_daily(
    week: &LeagueWeek,
    matches: impl Fn(&super::models::LeagueDay) -> bool,
) -> Option<BestDaily> {
    let mut best: Option<BestDaily> = None;

    for day in week.days.values().filter(|day| matches(day)) {
        for (geo_id, score) in &day.scores {
            if !score.is_finite() {
                continue;
            }
            if best.as_ref().is_none_or(|b| *score > b.score) {
                best = Some(BestDaily {
                    geo_id: geo_id.clone(),
                    score: *score,
                    date: day.date.clone(),
                    day_index: day.day_index,
                });
            }
        }
    }

    best
}

struct TableRow {
    name: String,
    per_day: Vec<Option<f64>>,
    total: f64,
}

/// Monday..Sunday grid: one row per player who scored at least once, one
/// `D<dayIndex>` column per date plus a running total. Rows sort by total
/// descending (stable sort is the tiebreak) and truncate to the configured
/// top-N. Column widths fit the longest rendered value, with minimums.
pub fn build_table(
    week: &LeagueWeek,
    players: &BTreeMap<GeoId, PlayerProfile>,
    settings: &LeagueSettings,
) -> Result<RenderedTable> {
    const MIN_COL_WIDTH: usize = 6;

    let monday = parse_ymd(&week.week_start)?;
    let dates: Vec<String> = week_dates(monday).into_iter().map(to_ymd).collect();

    // Day-number headers: stored index when the day exists, epoch-derived otherwise.
    let headers: Vec<String> = week_dates(monday)
        .into_iter()
        .zip(&dates)
        .map(|(date, key)| {
            let index = week
                .days
                .get(key)
                .map(|day| day.day_index)
                .unwrap_or_else(|| day_index_for(settings, date));
            format!("D{index}")
        })
        .collect();

    let mut ids: BTreeSet<&GeoId> = BTreeSet::new();
    for date in &dates {
        if let Some(day) = week.days.get(date) {
            ids.extend(day.scores.keys());
        }
    }

    let mut rows: Vec<TableRow> = ids
        .into_iter()
        .map(|geo_id| {
            let per_day: Vec<Option<f64>> = dates
                .iter()
                .map(|date| {
                    week.days
                        .get(date)
                        .and_then(|day| day.scores.get(geo_id))
                        .copied()
                        .filter(|v| v.is_finite())
                })
                .collect();
            let total = per_day.iter().flatten().sum();
            TableRow {
                name: display_name(players, geo_id),
                per_day,
                total,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    rows.truncate(settings.weekly_top_n);

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.per_day
                .iter()
                .map(|v| match v {
                    Some(v) => group_thousands(*v),
                    None => "-".to_string(),
                })
                .collect()
        })
        .collect();
    let totals: Vec<String> = rows.iter().map(|row| group_thousands(row.total)).collect();

    let name_width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_COL_WIDTH);
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
                .max(MIN_COL_WIDTH)
        })
        .collect();
    let total_width = totals
        .iter()
        .map(|t| t.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_COL_WIDTH);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let header_cols: Vec<String> = headers
        .iter()
        .zip(&col_widths)
        .map(|(header, width)| pad_left(header, *width))
        .collect();
    lines.push(format!(
        "{} {} {}",
        pad_right("NAME", name_width),
        header_cols.join(" "),
        pad_left("TOTAL", total_width)
    ));

    for ((row, row_cells), total) in rows.iter().zip(&cells).zip(&totals) {
        let padded: Vec<String> = row_cells
            .iter()
            .zip(&col_widths)
            .map(|(cell, width)| pad_left(cell, *width))
            .collect();
        lines.push(format!(
            "{} {} {}",
            pad_right(&row.name, name_width),
            padded.join(" "),
            pad_left(total, total_width)
        ));
    }

    Ok(RenderedTable {
        title: format!("Week {} ({})", week.week_index, week.week_start),
        table: lines.join("\n"),
    })
}

fn display_name(players: &BTreeMap<GeoId, PlayerProfile>, geo_id: &str) -> String {
    players
        .get(geo_id)
        .filter(|p| !p.nick.is_empty())
        .map(|p| p.nick.clone())
        .unwrap_or_else(|| geo_id.to_string())
}
