use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::store::models::{GameMode, GeoId};

use super::range::FlatDay;

#[derive(Debug, Clone, PartialEq)]
pub struct TopMapRow {
    pub map_id: String,
    pub map_name: String,
    pub count: usize,
}

/// Days each map appeared on. Ties keep encounter order (stable sort).
pub fn top_maps(days: &[FlatDay], top_n: usize) -> Vec<TopMapRow> {
    let mut rows: Vec<TopMapRow> = Vec::new();

    for flat in days {
        let Some(map_id) = &flat.day.map_id else {
            continue;
        };
        match rows.iter_mut().find(|r| &r.map_id == map_id) {
            Some(row) => row.count += 1,
            None => rows.push(TopMapRow {
                map_id: map_id.clone(),
                map_name: flat
                    .day
                    .map_name
                    .clone()
                    .unwrap_or_else(|| map_id.clone()),
                count: 1,
            }),
        }
    }

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(top_n);
    rows
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeStats {
    pub total_days: usize,
    pub counted_days: usize,
    pub move_days: usize,
    pub nm_days: usize,
    pub nmpz_days: usize,
    pub unknown: usize,
}

pub fn mode_stats(days: &[FlatDay]) -> ModeStats {
    let mut stats = ModeStats {
        total_days: days.len(),
        ..ModeStats::default()
    };

    for flat in days {
        match flat.day.mode {
            None => stats.unknown += 1,
            Some(mode) => {
                stats.counted_days += 1;
                match mode {
                    GameMode::Move => stats.move_days += 1,
                    GameMode::Nm => stats.nm_days += 1,
                    GameMode::Nmpz => stats.nmpz_days += 1,
                }
            }
        }
    }

    stats
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDaysRow {
    pub geo_id: GeoId,
    pub days_played: usize,
}

pub fn player_days_played(days: &[FlatDay]) -> Vec<PlayerDaysRow> {
    let mut counts: BTreeMap<&GeoId, usize> = BTreeMap::new();
    for flat in days {
        for geo_id in flat.day.scores.keys() {
            *counts.entry(geo_id).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<PlayerDaysRow> = counts
        .into_iter()
        .map(|(geo_id, days_played)| PlayerDaysRow {
            geo_id: geo_id.clone(),
            days_played,
        })
        .collect();
    rows.sort_by(|a, b| b.days_played.cmp(&a.days_played));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAvgRow {
    pub geo_id: GeoId,
    pub days_played: usize,
    pub total: f64,
    pub avg: f64,
}

/// Mean score per player over the days they played. Players under the
/// participation threshold are excluded, never zero-filled.
pub fn player_average_score(days: &[FlatDay], min_days: usize) -> Vec<PlayerAvgRow> {
    let mut rows: Vec<PlayerAvgRow> = accumulate_totals(days)
        .into_iter()
        .filter(|(_, (_, count))| *count >= min_days)
        .map(|(geo_id, (total, count))| PlayerAvgRow {
            geo_id,
            days_played: count,
            total,
            avg: total / count as f64,
        })
        .collect();

    rows.sort_by(|a, b| b.avg.partial_cmp(&a.avg).unwrap_or(Ordering::Equal));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTotalRow {
    pub geo_id: GeoId,
    pub total: f64,
    pub days_played: usize,
}

/// Per-player sums across the range; source of period podiums.
pub fn player_totals(days: &[FlatDay]) -> Vec<PlayerTotalRow> {
    let mut rows: Vec<PlayerTotalRow> = accumulate_totals(days)
        .into_iter()
        .map(|(geo_id, (total, count))| PlayerTotalRow {
            geo_id,
            total,
            days_played: count,
        })
        .collect();

    rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    rows
}

fn accumulate_totals(days: &[FlatDay]) -> BTreeMap<GeoId, (f64, usize)> {
    let mut totals: BTreeMap<GeoId, (f64, usize)> = BTreeMap::new();
    for flat in days {
        for (geo_id, score) in &flat.day.scores {
            if !score.is_finite() {
                continue;
            }
            let entry = totals.entry(geo_id.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestDayRow {
    pub geo_id: GeoId,
    pub score: f64,
    pub date: String,
    pub day_index: i64,
    pub map_name: Option<String>,
    pub mode: Option<GameMode>,
    pub round_count: Option<u32>,
    pub time_limit: Option<u32>,
}

/// The single highest score across the range, optionally restricted to days
/// with a specific round count.
pub fn best_single_day(days: &[FlatDay], rounds: Option<u32>) -> Option<BestDayRow> {
    let mut best: Option<BestDayRow> = None;

    for flat in days {
        if let Some(rounds) = rounds {
            if flat.day.round_count != Some(rounds) {
                continue;
            }
        }
        for (geo_id, score) in &flat.day.scores {
            if !score.is_finite() {
                continue;
            }
            if best.as_ref().is_none_or(|b| *score > b.score) {
                best = Some(BestDayRow {
                    geo_id: geo_id.clone(),
                    score: *score,
                    date: flat.day.date.clone(),
                    day_index: flat.day.day_index,
                    map_name: flat.day.map_name.clone(),
                    mode: flat.day.mode,
                    round_count: flat.day.round_count,
                    time_limit: flat.day.time_limit,
                });
            }
        }
    }

    best
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementRow {
    pub geo_id: GeoId,
    pub first_days: usize,
    pub second_days: usize,
    pub first_avg: f64,
    pub second_avg: f64,
    pub delta: f64,
}

/// Split each month at day 15: mean in both halves, ranked by the gain.
/// Computed across the whole supplied range; pre-filter to one month for a
/// single-month comparison.
pub fn top_improvements(
    days: &[FlatDay],
    top_n: usize,
    min_days_per_half: usize,
) -> Vec<ImprovementRow> {
    struct Halves {
        first_total: f64,
        first_days: usize,
        second_total: f64,
        second_days: usize,
    }

    let mut by_player: BTreeMap<GeoId, Halves> = BTreeMap::new();

    for flat in days {
        let day_of_month: u32 = flat
            .day
            .date
            .get(8..10)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let first_half = day_of_month <= 15;

        for (geo_id, score) in &flat.day.scores {
            if !score.is_finite() {
                continue;
            }
            let entry = by_player.entry(geo_id.clone()).or_insert(Halves {
                first_total: 0.0,
                first_days: 0,
                second_total: 0.0,
                second_days: 0,
            });
            if first_half {
                entry.first_total += score;
                entry.first_days += 1;
            } else {
                entry.second_total += score;
                entry.second_days += 1;
            }
        }
    }

    let mut rows: Vec<ImprovementRow> = by_player
        .into_iter()
        .filter(|(_, h)| h.first_days >= min_days_per_half && h.second_days >= min_days_per_half)
        .map(|(geo_id, h)| {
            let first_avg = h.first_total / h.first_days as f64;
            let second_avg = h.second_total / h.second_days as f64;
            ImprovementRow {
                geo_id,
                first_days: h.first_days,
                second_days: h.second_days,
                first_avg,
                second_avg,
                delta: second_avg - first_avg,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.delta.partial_cmp(&a.delta).unwrap_or(Ordering::Equal));
    rows.truncate(top_n);
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapAvgRow {
    pub map_id: String,
    pub map_name: String,
    pub plays: usize,
    pub days: usize,
    pub avg: f64,
}

/// Per-map mean over all plays (all players), restricted to maps that
/// appeared on enough distinct days.
pub fn top_maps_by_average_score(
    days: &[FlatDay],
    top_n: usize,
    min_map_days: usize,
) -> Vec<MapAvgRow> {
    struct MapAgg {
        map_id: String,
        map_name: String,
        sum: f64,
        plays: usize,
        day_set: BTreeSet<String>,
    }

    let mut aggs: Vec<MapAgg> = Vec::new();

    for flat in days {
        let Some(map_id) = &flat.day.map_id else {
            continue;
        };
        let agg = match aggs.iter_mut().find(|a| &a.map_id == map_id) {
            Some(agg) => agg,
            None => {
                aggs.push(MapAgg {
                    map_id: map_id.clone(),
                    map_name: flat
                        .day
                        .map_name
                        .clone()
                        .unwrap_or_else(|| map_id.clone()),
                    sum: 0.0,
                    plays: 0,
                    day_set: BTreeSet::new(),
                });
                aggs.last_mut().expect("just pushed")
            }
        };

        agg.day_set.insert(flat.day.date.clone());
        for score in flat.day.scores.values() {
            if !score.is_finite() {
                continue;
            }
            agg.sum += score;
            agg.plays += 1;
        }
    }

    let mut rows: Vec<MapAvgRow> = aggs
        .into_iter()
        .filter(|a| a.day_set.len() >= min_map_days)
        .map(|a| MapAvgRow {
            avg: if a.plays > 0 { a.sum / a.plays as f64 } else { 0.0 },
            days: a.day_set.len(),
            map_id: a.map_id,
            map_name: a.map_name,
            plays: a.plays,
        })
        .collect();

    rows.sort_by(|a, b| b.avg.partial_cmp(&a.avg).unwrap_or(Ordering::Equal));
    rows.truncate(top_n);
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapBestPlayerRow {
    pub map_id: String,
    pub map_name: String,
    pub geo_id: GeoId,
    pub plays: usize,
    pub avg: f64,
}

/// For each requested map, the player with the best personal mean on it,
/// among players with enough plays there.
pub fn best_player_per_map(
    days: &[FlatDay],
    map_ids: &[String],
    min_player_plays: usize,
) -> Vec<MapBestPlayerRow> {
    struct PerMap {
        map_id: String,
        map_name: String,
        players: BTreeMap<GeoId, (f64, usize)>,
    }

    let mut aggs: Vec<PerMap> = Vec::new();

    for flat in days {
        let Some(map_id) = &flat.day.map_id else {
            continue;
        };
        if !map_ids.contains(map_id) {
            continue;
        }

        let agg = match aggs.iter_mut().find(|a| &a.map_id == map_id) {
            Some(agg) => agg,
            None => {
                aggs.push(PerMap {
                    map_id: map_id.clone(),
                    map_name: flat
                        .day
                        .map_name
                        .clone()
                        .unwrap_or_else(|| map_id.clone()),
                    players: BTreeMap::new(),
                });
                aggs.last_mut().expect("just pushed")
            }
        };

        for (geo_id, score) in &flat.day.scores {
            if !score.is_finite() {
                continue;
            }
            let entry = agg.players.entry(geo_id.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    let mut out = Vec::new();
    for agg in aggs {
        let mut best: Option<MapBestPlayerRow> = None;
        for (geo_id, (sum, plays)) in agg.players {
            if plays < min_player_plays {
                continue;
            }
            let avg = sum / plays as f64;
            if best.as_ref().is_none_or(|b| avg > b.avg) {
                best = Some(MapBestPlayerRow {
                    map_id: agg.map_id.clone(),
                    map_name: agg.map_name.clone(),
                    geo_id,
                    plays,
                    avg,
                });
            }
        }
        if let Some(best) = best {
            out.push(best);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{DailyScores, LeagueDay};

    fn flat(date: &str, map: Option<(&str, &str)>, scores: &[(&str, f64)]) -> FlatDay {
        FlatDay {
            week_start: "2026-01-12".to_string(),
            week_index: 107,
            day: LeagueDay {
                date: date.to_string(),
                day_index: 743,
                token: String::new(),
                map_id: map.map(|(id, _)| id.to_string()),
                map_name: map.map(|(_, name)| name.to_string()),
                map_url: None,
                mode: None,
                round_count: None,
                time_limit: None,
                scores: scores
                    .iter()
                    .map(|(id, v)| (id.to_string(), *v))
                    .collect::<DailyScores>(),
            },
        }
    }

    #[test]
    fn test_top_maps_ties_keep_encounter_order() {
        let days = vec![
            flat("2026-01-12", Some(("b", "Map B")), &[]),
            flat("2026-01-13", Some(("a", "Map A")), &[]),
            flat("2026-01-14", Some(("a", "Map A")), &[]),
            flat("2026-01-15", Some(("c", "Map C")), &[]),
            flat("2026-01-16", None, &[]),
        ];

        let rows = top_maps(&days, 5);
        assert_eq!(rows[0].map_id, "a");
        assert_eq!(rows[0].count, 2);
        // b and c tie at 1; b was encountered first
        assert_eq!(rows[1].map_id, "b");
        assert_eq!(rows[2].map_id, "c");
    }

    #[test]
    fn test_mode_stats_counts_unknown() {
        let mut move_day = flat("2026-01-12", None, &[]);
        move_day.day.mode = Some(GameMode::Move);
        let mut nmpz_day = flat("2026-01-13", None, &[]);
        nmpz_day.day.mode = Some(GameMode::Nmpz);
        let unknown_day = flat("2026-01-14", None, &[]);

        let stats = mode_stats(&[move_day, nmpz_day, unknown_day]);
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.counted_days, 2);
        assert_eq!(stats.move_days, 1);
        assert_eq!(stats.nmpz_days, 1);
        assert_eq!(stats.unknown, 1);
    }

    #[test]
    fn test_player_average_excludes_below_min_days() {
        let days = vec![
            flat("2026-01-12", None, &[("steady", 10000.0), ("hot", 25000.0)]),
            flat("2026-01-13", None, &[("steady", 11000.0), ("hot", 25000.0)]),
            flat("2026-01-14", None, &[("steady", 12000.0)]),
        ];

        // "hot" would rank first on mean but only played 2 days
        let rows = player_average_score(&days, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].geo_id, "steady");
        assert_eq!(rows[0].avg, 11000.0);
    }

    #[test]
    fn test_non_finite_scores_are_skipped() {
        let days = vec![
            flat("2026-01-12", None, &[("p1", f64::NAN)]),
            flat("2026-01-13", None, &[("p1", 100.0)]),
        ];

        let rows = player_average_score(&days, 1);
        assert_eq!(rows[0].days_played, 1);
        assert_eq!(rows[0].avg, 100.0);
        assert!(best_single_day(&days[..1], None).is_none());
    }

    #[test]
    fn test_best_single_day_rounds_filter() {
        let mut five = flat("2026-01-12", Some(("a", "Map A")), &[("p1", 24000.0)]);
        five.day.round_count = Some(5);
        let mut ten = flat("2026-01-14", Some(("b", "Map B")), &[("p2", 47000.0)]);
        ten.day.round_count = Some(10);
        ten.day.day_index = 745;
        let days = vec![five, ten];

        let overall = best_single_day(&days, None).unwrap();
        assert_eq!(overall.geo_id, "p2");
        assert_eq!(overall.day_index, 745);

        let five_best = best_single_day(&days, Some(5)).unwrap();
        assert_eq!(five_best.geo_id, "p1");
        assert_eq!(five_best.map_name.as_deref(), Some("Map A"));

        assert!(best_single_day(&days, Some(3)).is_none());
    }

    #[test]
    fn test_top_improvements_split_at_mid_month() {
        let days = vec![
            flat("2026-01-05", None, &[("riser", 10000.0), ("flat", 20000.0)]),
            flat("2026-01-10", None, &[("riser", 10000.0), ("flat", 20000.0)]),
            flat("2026-01-20", None, &[("riser", 16000.0), ("flat", 20000.0)]),
            flat("2026-01-25", None, &[("riser", 18000.0), ("flat", 20000.0)]),
        ];

        let rows = top_improvements(&days, 3, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].geo_id, "riser");
        assert_eq!(rows[0].first_avg, 10000.0);
        assert_eq!(rows[0].second_avg, 17000.0);
        assert_eq!(rows[0].delta, 7000.0);
        assert_eq!(rows[1].delta, 0.0);

        // requiring 3 days per half excludes everyone
        assert!(top_improvements(&days, 3, 3).is_empty());
    }

    #[test]
    fn test_player_totals_rank_by_sum() {
        let days = vec![
            flat("2026-01-12", None, &[("p1", 100.0), ("p2", 200.0)]),
            flat("2026-01-13", None, &[("p1", 300.0)]),
        ];

        let rows = player_totals(&days);
        assert_eq!(rows[0].geo_id, "p1");
        assert_eq!(rows[0].total, 400.0);
        assert_eq!(rows[0].days_played, 2);
        assert_eq!(rows[1].geo_id, "p2");
    }

    #[test]
    fn test_map_average_respects_min_days() {
        let days = vec![
            flat("2026-01-12", Some(("a", "Map A")), &[("p1", 10000.0)]),
            flat("2026-01-13", Some(("a", "Map A")), &[("p1", 20000.0)]),
            flat("2026-01-14", Some(("b", "Map B")), &[("p1", 50000.0)]),
        ];

        let rows = top_maps_by_average_score(&days, 5, 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].map_id, "a");
        assert_eq!(rows[0].plays, 2);
        assert_eq!(rows[0].days, 2);
        assert_eq!(rows[0].avg, 15000.0);
    }

    #[test]
    fn test_best_player_per_map_threshold() {
        let days = vec![
            flat(
                "2026-01-12",
                Some(("a", "Map A")),
                &[("regular", 10000.0), ("oneshot", 25000.0)],
            ),
            flat("2026-01-13", Some(("a", "Map A")), &[("regular", 12000.0)]),
        ];

        let rows = best_player_per_map(&days, &["a".to_string()], 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].geo_id, "regular");
        assert_eq!(rows[0].avg, 11000.0);

        // maps not asked for produce nothing
        assert!(best_player_per_map(&days, &["zzz".to_string()], 1).is_empty());
    }
}
