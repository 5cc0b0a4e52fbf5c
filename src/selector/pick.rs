use anyhow::{ensure, Result};
use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::SelectorSettings;
use crate::store::calendar::parse_ymd;
use crate::store::models::{GameMode, Store};

use super::catalog::{MapCatalog, MapConfig};

/// A historical selection reconstructed from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentPick {
    pub date: NaiveDate,
    pub map_id: String,
    pub mode: Option<GameMode>,
}

/// Most recent days that carry both a date and a map id, newest first,
/// capped to the lookback window.
pub fn recent_picks(store: &Store, limit: usize) -> Vec<RecentPick> {
    let mut days: Vec<_> = store
        .weeks
        .values()
        .flat_map(|week| week.days.values())
        .collect();
    days.sort_by(|a, b| b.date.cmp(&a.date));

    days.into_iter()
        .filter_map(|day| {
            let map_id = day.map_id.clone()?;
            let date = parse_ymd(&day.date).ok()?;
            Some(RecentPick {
                date,
                map_id,
                mode: day.mode,
            })
        })
        .take(limit)
        .collect()
}

/// Today's configuration, ready for the match-creation collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub map_id: String,
    pub map_name: String,
    pub map_url: String,
    pub mode: GameMode,
    pub round_count: u32,
    pub time_limit: u32,
}

/// Ordered pipeline: cooldown filter (with full-catalog fallback), weighted
/// map pick, mode pick under the fairness rules, then calendar-derived
/// round count and time limit.
pub fn select_daily_challenge(
    catalog: &MapCatalog,
    today: NaiveDate,
    recent: &[RecentPick],
    settings: &SelectorSettings,
    rng: &mut impl Rng,
) -> Result<DailyChallenge> {
    ensure!(!catalog.maps.is_empty(), "map catalog has no maps");

    let candidates = filter_by_cooldown(&catalog.maps, today, recent);
    let pool: Vec<&MapConfig> = if candidates.is_empty() {
        // cooldowns must never make selection impossible
        catalog.maps.iter().collect()
    } else {
        candidates
    };

    let map = weighted_pick(rng, &pool, |m| m.weight.unwrap_or(1.0));
    let last_mode = recent.first().and_then(|pick| pick.mode);
    let mode = pick_mode(rng, map, last_mode, recent, settings);

    Ok(DailyChallenge {
        map_id: map.id.clone(),
        map_name: map.name.clone(),
        map_url: map.url.clone(),
        mode,
        round_count: round_count_for(today, settings),
        time_limit: time_limit_for(rng, mode, today, settings),
    })
}

/// Keeps maps whose cooldown elapsed: strictly more days since the last
/// pick than the configured cooldown.
fn filter_by_cooldown<'a>(
    maps: &'a [MapConfig],
    today: NaiveDate,
    recent: &[RecentPick],
) -> Vec<&'a MapConfig> {
    maps.iter()
        .filter(|map| {
            let Some(cooldown) = map.cooldown_days.filter(|cd| *cd > 0) else {
                return true;
            };
            let Some(last) = recent.iter().find(|pick| pick.map_id == map.id) else {
                return true;
            };
            (today - last.date).num_days().abs() > cooldown
        })
        .collect()
}

/// Negative weights clamp to zero; an all-zero pool degrades to uniform.
fn weighted_pick<'a, T>(
    rng: &mut impl Rng,
    items: &[&'a T],
    weight_of: impl Fn(&T) -> f64,
) -> &'a T {
    let weights: Vec<f64> = items.iter().map(|item| weight_of(item).max(0.0)).collect();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 {
        return items[rng.gen_range(0..items.len())];
    }

    let mut roll = rng.r#gen::<f64>() * total;
    for (item, weight) in items.iter().zip(&weights) {
        roll -= weight;
        if roll <= 0.0 {
            return item;
        }
    }
    items[items.len() - 1]
}

fn move_cap_reached(recent: &[RecentPick], settings: &SelectorSettings) -> bool {
    recent
        .iter()
        .take(settings.move_window)
        .filter(|pick| pick.mode == Some(GameMode::Move))
        .count()
        >= settings.move_cap
}

fn pick_mode(
    rng: &mut impl Rng,
    map: &MapConfig,
    last_mode: Option<GameMode>,
    recent: &[RecentPick],
    settings: &SelectorSettings,
) -> GameMode {
    let allowed = &map.modes.allowed;
    let recommended = &map.modes.recommended;

    let mut pool: Vec<GameMode> =
        if !recommended.is_empty() && rng.r#gen::<f64>() < settings.recommended_bias {
            recommended.clone()
        } else {
            allowed.clone()
        };

    // avoid repeating yesterday's mode when an alternative exists
    if let Some(last) = last_mode {
        if pool.len() > 1 && pool.contains(&last) {
            let filtered: Vec<GameMode> = pool.iter().copied().filter(|m| *m != last).collect();
            if !filtered.is_empty() {
                pool = filtered;
            }
        }
    }

    // league-wide cap: at most `move_cap` move days per trailing window
    if move_cap_reached(recent, settings) && pool.contains(&GameMode::Move) {
        let without_move: Vec<GameMode> = pool
            .iter()
            .copied()
            .filter(|m| *m != GameMode::Move)
            .collect();
        if !without_move.is_empty() {
            pool = without_move;
        } else if let Some(fallback) = allowed
            .iter()
            .copied()
            .filter(|m| *m != GameMode::Move)
            .max_by_key(|m| m.restrictiveness())
        {
            pool = vec![fallback];
        }
        // a move-only map keeps move: the cap must not block selection
    }

    let mode = pool
        .choose(rng)
        .copied()
        .or_else(|| allowed.first().copied())
        .unwrap_or(GameMode::Nm);

    // safety: the final mode must be one the map allows
    if allowed.contains(&mode) {
        mode
    } else {
        allowed.first().copied().unwrap_or(mode)
    }
}

fn round_count_for(today: NaiveDate, settings: &SelectorSettings) -> u32 {
    if today.weekday() == settings.ten_round_weekday {
        10
    } else {
        5
    }
}

fn time_limit_for(
    rng: &mut impl Rng,
    mode: GameMode,
    today: NaiveDate,
    settings: &SelectorSettings,
) -> u32 {
    if mode == GameMode::Move {
        *settings.move_time_limits.choose(rng).unwrap_or(&60)
    } else if today.weekday() == settings.fast_weekday {
        settings.fast_time_limit
    } else {
        *settings.short_time_limits.choose(rng).unwrap_or(&30)
    }
}
