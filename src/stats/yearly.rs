use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::render::{group_thousands, pad_left, pad_right, RenderedTable};
use crate::store::models::{GeoId, Store};

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyRow {
    pub geo_id: GeoId,
    pub total: f64,
    pub days_played: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyBestDay {
    pub geo_id: GeoId,
    pub date: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyStats {
    pub rows: Vec<YearlyRow>,
    /// Distinct challenge days recorded in the year.
    pub total_days_in_year: usize,
    pub best_day: Option<YearlyBestDay>,
}

pub fn yearly_stats(store: &Store, year: i32) -> YearlyStats {
    let mut totals: BTreeMap<GeoId, (f64, usize)> = BTreeMap::new();
    let mut recorded_days: BTreeSet<&str> = BTreeSet::new();
    let mut best_day: Option<YearlyBestDay> = None;

    for week in store.weeks.values() {
        for day in week.days.values() {
            if day_year(&day.date) != Some(year) {
                continue;
            }
            recorded_days.insert(&day.date);

            for (geo_id, score) in &day.scores {
                if !score.is_finite() {
                    continue;
                }
                let entry = totals.entry(geo_id.clone()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;

                if best_day.as_ref().is_none_or(|b| *score > b.score) {
                    best_day = Some(YearlyBestDay {
                        geo_id: geo_id.clone(),
                        date: day.date.clone(),
                        score: *score,
                    });
                }
            }
        }
    }

    let mut rows: Vec<YearlyRow> = totals
        .into_iter()
        .map(|(geo_id, (total, days_played))| YearlyRow {
            geo_id,
            total,
            days_played,
            average: if days_played > 0 {
                total / days_played as f64
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));

    YearlyStats {
        rows,
        total_days_in_year: recorded_days.len(),
        best_day,
    }
}

/// Players who played every recorded day of the year.
pub fn yearly_full_attendance(store: &Store, year: i32) -> Vec<GeoId> {
    let stats = yearly_stats(store, year);
    if stats.total_days_in_year == 0 {
        return Vec::new();
    }
    stats
        .rows
        .into_iter()
        .filter(|r| r.days_played == stats.total_days_in_year)
        .map(|r| r.geo_id)
        .collect()
}

/// Rank/name/country/days/total/average grid. The country column keeps its
/// own slot so alignment survives inside code blocks.
pub fn build_yearly_table(store: &Store, year: i32, top_n: usize) -> RenderedTable {
    struct Printed {
        rank: String,
        nick: String,
        country: String,
        days: String,
        total: String,
        avg: String,
    }

    let stats = yearly_stats(store, year);
    let printed: Vec<Printed> = stats
        .rows
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, row)| {
            let profile = store.players.get(&row.geo_id);
            Printed {
                rank: (i + 1).to_string(),
                nick: profile
                    .filter(|p| !p.nick.is_empty())
                    .map(|p| p.nick.clone())
                    .unwrap_or_else(|| row.geo_id.clone()),
                country: profile
                    .and_then(|p| p.country.clone())
                    .unwrap_or_default()
                    .to_uppercase(),
                days: row.days_played.to_string(),
                total: group_thousands(row.total),
                avg: if row.days_played > 0 {
                    group_thousands(row.average)
                } else {
                    "0".to_string()
                },
            }
        })
        .collect();

    let headers = ["#", "NAME", "CTRY", "DAYS", "TOTAL", "AVG"];
    let rank_width = printed
        .iter()
        .map(|r| r.rank.chars().count())
        .max()
        .unwrap_or(1)
        .max(2);
    let name_width = printed
        .iter()
        .map(|r| r.nick.chars().count())
        .max()
        .unwrap_or(0)
        .max(12);
    let country_width = 4;
    let days_width = width_for(headers[3], printed.iter().map(|r| r.days.as_str()));
    let total_width = width_for(headers[4], printed.iter().map(|r| r.total.as_str()));
    let avg_width = width_for(headers[5], printed.iter().map(|r| r.avg.as_str()));

    let sep = " | ";
    let mut lines = Vec::with_capacity(printed.len() + 2);
    lines.push(format!(
        "{}  {}  {}{sep}{}{sep}{}{sep}{}",
        pad_left(headers[0], rank_width),
        pad_right(headers[1], name_width),
        pad_right(headers[2], country_width),
        pad_left(headers[3], days_width),
        pad_left(headers[4], total_width),
        pad_left(headers[5], avg_width),
    ));
    lines.push(format!(
        "{}  {}  {}{sep}{}{sep}{}{sep}{}",
        "-".repeat(rank_width),
        "-".repeat(name_width),
        "-".repeat(country_width),
        "-".repeat(days_width),
        "-".repeat(total_width),
        "-".repeat(avg_width),
    ));

    for row in &printed {
        lines.push(format!(
            "{}  {}  {}{sep}{}{sep}{}{sep}{}",
            pad_left(&row.rank, rank_width),
            pad_right(&row.nick, name_width),
            pad_right(&row.country, country_width),
            pad_left(&row.days, days_width),
            pad_left(&row.total, total_width),
            pad_left(&row.avg, avg_width),
        ));
    }

    RenderedTable {
        title: format!(
            "YEAR {year} (days recorded: {})",
            stats.total_days_in_year
        ),
        table: lines.join("\n"),
    }
}

fn width_for<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.chars().count())
}

fn day_year(date: &str) -> Option<i32> {
    if date.len() != 10 {
        return None;
    }
    date.get(..4)?.parse().ok()
}
