use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type GeoId = String;

/// Player id -> total score for one day.
pub type DailyScores = BTreeMap<GeoId, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Move,
    Nm,
    Nmpz,
}

impl GameMode {
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Move => "Move",
            GameMode::Nm => "NM",
            GameMode::Nmpz => "NMPZ",
        }
    }

    /// Higher means fewer player freedoms (NMPZ forbids moving, rotating and
    /// zooming; NM only moving).
    pub fn restrictiveness(&self) -> u8 {
        match self {
            GameMode::Move => 0,
            GameMode::Nm => 1,
            GameMode::Nmpz => 2,
        }
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "move" => Ok(GameMode::Move),
            "nm" => Ok(GameMode::Nm),
            "nmpz" => Ok(GameMode::Nmpz),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// One calendar date's recorded challenge configuration and scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDay {
    pub date: String,
    pub day_index: i64,
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GameMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,

    #[serde(default)]
    pub scores: DailyScores,
}

impl LeagueDay {
    /// Per-field update: a field only changes when the incoming config
    /// carries a value, so resyncs never wipe stored metadata.
    pub fn apply_challenge(&mut self, config: &ChallengeConfig) {
        if config.map_id.is_some() {
            self.map_id = config.map_id.clone();
        }
        if config.map_name.is_some() {
            self.map_name = config.map_name.clone();
        }
        if config.map_url.is_some() {
            self.map_url = config.map_url.clone();
        }
        if config.mode.is_some() {
            self.mode = config.mode;
        }
        if config.round_count.is_some() {
            self.round_count = config.round_count;
        }
        if config.time_limit.is_some() {
            self.time_limit = config.time_limit;
        }
    }
}

/// Challenge metadata attached to a day when the match is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeConfig {
    pub map_id: Option<String>,
    pub map_name: Option<String>,
    pub map_url: Option<String>,
    pub mode: Option<GameMode>,
    pub round_count: Option<u32>,
    pub time_limit: Option<u32>,
}

/// Monday-keyed aggregation unit of seven days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueWeek {
    pub week_start: String,
    pub week_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days: BTreeMap<String, LeagueDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    #[serde(default)]
    pub nick: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
}

/// Identity data arriving with a results feed; never persisted as-is.
#[derive(Debug, Clone)]
pub struct PlayerUpdate {
    pub nick: String,
    pub country: Option<String>,
}

/// Root persisted document. `BTreeMap` keys keep serialization and derived
/// tables byte-stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub weeks: BTreeMap<String, LeagueWeek>,
    #[serde(default)]
    pub players: BTreeMap<GeoId, PlayerProfile>,
}
