use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};

#[derive(Debug, Clone)]
pub struct LeagueSettings {
    pub epoch: NaiveDate,
    pub day_index_start: i64,
    pub week_index_start: i64,
    pub weekly_top_n: usize,
    pub yearly_top_n: usize,
    pub monthly_top_maps: usize,
    pub monthly_min_avg_days: usize,
    pub monthly_min_half_days: usize,
    pub monthly_min_map_days: usize,
    pub monthly_min_map_plays: usize,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(2024, 1, 1).expect("static epoch date"),
            day_index_start: 1,
            week_index_start: 1,
            weekly_top_n: 20,
            yearly_top_n: 30,
            monthly_top_maps: 5,
            monthly_min_avg_days: 3,
            monthly_min_half_days: 2,
            monthly_min_map_days: 2,
            monthly_min_map_plays: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectorSettings {
    pub lookback: usize,
    pub recommended_bias: f64,
    pub move_window: usize,
    pub move_cap: usize,
    pub ten_round_weekday: Weekday,
    pub fast_weekday: Weekday,
    pub fast_time_limit: u32,
    pub move_time_limits: &'static [u32],
    pub short_time_limits: &'static [u32],
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            lookback: 60,
            recommended_bias: 0.7,
            move_window: 7, // sliding window of recent picks
            move_cap: 1,
            ten_round_weekday: Weekday::Wed,
            fast_weekday: Weekday::Mon,
            fast_time_limit: 10,
            move_time_limits: &[60, 90, 120, 180],
            short_time_limits: &[20, 30, 60],
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl StorageSettings {
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("league.json")
    }

    pub fn maps_path(&self) -> PathBuf {
        self.data_dir.join("maps.json")
    }
}

pub struct AppConfig {
    pub league: LeagueSettings,
    pub selector: SelectorSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Defaults plus a handful of environment overrides. Everything else is
    /// injected explicitly (Dependency Injection) rather than read from
    /// ambient globals, so tests can pass deterministic values.
    pub fn new() -> Self {
        let mut config = Self {
            league: LeagueSettings::default(),
            selector: SelectorSettings::default(),
            storage: StorageSettings::default(),
        };

        if let Ok(dir) = std::env::var("LEAGUE_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(epoch) = env_date("LEAGUE_START_DATE") {
            config.league.epoch = epoch;
        }
        if let Some(base) = env_number("DAY_INDEX_START") {
            config.league.day_index_start = base;
        }
        if let Some(base) = env_number("WEEK_INDEX_START") {
            config.league.week_index_start = base;
        }
        if let Some(n) = env_number("WEEKLY_TOP_N") {
            config.league.weekly_top_n = n as usize;
        }
        if let Some(n) = env_number("YEARLY_TOP_N") {
            config.league.yearly_top_n = n as usize;
        }

        config
    }
}

fn env_date(key: &str) -> Option<NaiveDate> {
    let raw = std::env::var(key).ok()?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
}

fn env_number(key: &str) -> Option<i64> {
    std::env::var(key).ok()?.parse().ok()
}
