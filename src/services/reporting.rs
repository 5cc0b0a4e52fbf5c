use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::info;

use crate::config::AppConfig;
use crate::render::{group_thousands, simple_ranking_table};
use crate::stats::{
    best_player_per_map, best_single_day, days_in_range, mode_stats, month_range,
    build_yearly_table, player_average_score, player_days_played, player_totals, top_improvements,
    top_maps, top_maps_by_average_score, yearly_full_attendance, yearly_stats,
};
use crate::store::calendar::{monday_of, to_ymd};
use crate::store::models::{GeoId, PlayerProfile};
use crate::store::LeagueStore;

pub struct ReportingService {
    config: AppConfig,
}

impl ReportingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Prints the weekly summary. Without an explicit week start, reports the
    /// previous (unposted) week and skips quietly when there is none.
    pub fn weekly(&self, week_start: Option<NaiveDate>, mark_posted: bool) -> Result<()> {
        let store = self.league_store();

        let week_key = match week_start {
            Some(date) => to_ymd(monday_of(date)),
            None => match store.previous_week_key(Utc::now().date_naive())? {
                Some(key) => key,
                None => {
                    info!("No unposted previous week; nothing to report");
                    return Ok(());
                }
            },
        };
        info!("Weekly summary for week starting {week_key}");

        let players = store.players();

        let podium = store.weekly_podium(&week_key)?;
        if !podium.is_empty() {
            println!("Podium:");
            for (i, row) in podium.iter().enumerate() {
                println!(
                    "  {}. {} — {}",
                    i + 1,
                    display_name(&players, &row.geo_id),
                    group_thousands(row.total)
                );
            }
            println!();
        }

        let rendered = store.build_weekly_table(&week_key)?;
        println!("{}", rendered.title);
        println!("{}", rendered.table);
        println!();

        let attendance = store.weekly_perfect_attendance(&week_key)?;
        if !attendance.is_empty() {
            let names: Vec<String> = attendance
                .iter()
                .map(|id| display_name(&players, id))
                .collect();
            println!("Played all 7 days: {}", names.join(", "));
        }

        if let Some(best) = store.weekly_best_daily_by_rounds(&week_key, 10)? {
            println!(
                "Best 10-round day: {} — {} ({}, day {})",
                display_name(&players, &best.geo_id),
                group_thousands(best.score),
                best.date,
                best.day_index
            );
        }

        if mark_posted {
            store.mark_week_as_posted(&week_key, Utc::now())?;
            info!("Marked week {week_key} as posted");
        }
        Ok(())
    }

    /// Prints the monthly recap: maps, modes, consistency, averages, best
    /// single days and mid-month improvements.
    pub fn monthly(&self, year: i32, month: u32) -> Result<()> {
        let store = self.league_store();
        let league = &self.config.league;

        let (start, end) = month_range(year, month)?;
        let days = days_in_range(&store.load()?, &start, &end);
        info!("Monthly recap for {year}-{month:02}: {} recorded days", days.len());
        if days.is_empty() {
            println!("No days recorded in {year}-{month:02}.");
            return Ok(());
        }

        let players = store.players();
        println!("=== Recap {year}-{month:02} ({} days) ===", days.len());
        println!();

        let maps = top_maps(&days, league.monthly_top_maps);
        if !maps.is_empty() {
            println!("Most played maps:");
            for row in &maps {
                println!("  {} — {} days", row.map_name, row.count);
            }
            println!();
        }

        let by_avg =
            top_maps_by_average_score(&days, league.monthly_top_maps, league.monthly_min_map_days);
        if !by_avg.is_empty() {
            println!("Highest scoring maps:");
            let map_ids: Vec<String> = by_avg.iter().map(|r| r.map_id.clone()).collect();
            let champions = best_player_per_map(&days, &map_ids, league.monthly_min_map_plays);
            for row in &by_avg {
                let champion = champions
                    .iter()
                    .find(|c| c.map_id == row.map_id)
                    .map(|c| {
                        format!(
                            " (best: {} — {})",
                            display_name(&players, &c.geo_id),
                            group_thousands(c.avg)
                        )
                    })
                    .unwrap_or_default();
                println!(
                    "  {} — avg {} over {} days{champion}",
                    row.map_name,
                    group_thousands(row.avg),
                    row.days
                );
            }
            println!();
        }

        let modes = mode_stats(&days);
        if modes.counted_days > 0 {
            let pct = |n: usize| (n as f64 * 100.0 / modes.counted_days as f64).round();
            println!(
                "Modes: Move {}%, NM {}%, NMPZ {}% ({} of {} days tagged)",
                pct(modes.move_days),
                pct(modes.nm_days),
                pct(modes.nmpz_days),
                modes.counted_days,
                modes.total_days
            );
            println!();
        }

        let consistency = player_days_played(&days);
        if let Some(top) = consistency.first() {
            let leaders: Vec<String> = consistency
                .iter()
                .take_while(|r| r.days_played == top.days_played)
                .map(|r| display_name(&players, &r.geo_id))
                .collect();
            println!(
                "Most days played: {} ({} of {})",
                leaders.join(", "),
                top.days_played,
                days.len()
            );
        }

        let averages = player_average_score(&days, league.monthly_min_avg_days);
        if let Some(best) = averages.first() {
            println!(
                "Best daily average: {} — {} over {} days",
                display_name(&players, &best.geo_id),
                group_thousands(best.avg),
                best.days_played
            );
        }

        for rounds in [5u32, 10] {
            if let Some(best) = best_single_day(&days, Some(rounds)) {
                println!(
                    "Best {rounds}-round day: {} — {} ({})",
                    display_name(&players, &best.geo_id),
                    group_thousands(best.score),
                    best.date
                );
            }
        }
        println!();

        let improvements = top_improvements(&days, 3, league.monthly_min_half_days);
        if !improvements.is_empty() {
            println!("Most improved (second half vs first):");
            for row in &improvements {
                println!(
                    "  {} — +{} ({} → {})",
                    display_name(&players, &row.geo_id),
                    group_thousands(row.delta),
                    group_thousands(row.first_avg),
                    group_thousands(row.second_avg)
                );
            }
            println!();
        }

        let totals: Vec<(String, f64)> = player_totals(&days)
            .into_iter()
            .take(league.weekly_top_n)
            .map(|row| (display_name(&players, &row.geo_id), row.total))
            .collect();
        let rendered = simple_ranking_table(&format!("TOTALS {year}-{month:02}"), &totals);
        println!("{}", rendered.title);
        println!("{}", rendered.table);
        Ok(())
    }

    /// Prints the yearly standings and records.
    pub fn yearly(&self, year: i32) -> Result<()> {
        let store = self.league_store();
        let data = store.load()?;
        let players = store.players();

        let stats = yearly_stats(&data, year);
        info!("Yearly summary for {year}: {} recorded days", stats.total_days_in_year);
        if stats.total_days_in_year == 0 {
            println!("No days recorded in {year}.");
            return Ok(());
        }

        println!("Podium {year}:");
        for (i, row) in stats.rows.iter().take(3).enumerate() {
            println!(
                "  {}. {} — {}",
                i + 1,
                display_name(&players, &row.geo_id),
                group_thousands(row.total)
            );
        }
        println!();

        let attendance = yearly_full_attendance(&data, year);
        if !attendance.is_empty() {
            let names: Vec<String> = attendance
                .iter()
                .map(|id| display_name(&players, id))
                .collect();
            println!(
                "Played every day ({}): {}",
                stats.total_days_in_year,
                names.join(", ")
            );
        }

        if let Some(best) = &stats.best_day {
            println!(
                "Best single day: {} — {} ({})",
                display_name(&players, &best.geo_id),
                group_thousands(best.score),
                best.date
            );
        }
        println!();

        let rendered = build_yearly_table(&data, year, self.config.league.yearly_top_n);
        println!("{}", rendered.title);
        println!("{}", rendered.table);
        Ok(())
    }

    fn league_store(&self) -> LeagueStore {
        LeagueStore::new(
            self.config.storage.store_path(),
            self.config.league.clone(),
        )
    }
}

fn display_name(players: &BTreeMap<GeoId, PlayerProfile>, geo_id: &GeoId) -> String {
    players
        .get(geo_id)
        .filter(|p| !p.nick.is_empty())
        .map(|p| p.nick.clone())
        .unwrap_or_else(|| geo_id.clone())
}
