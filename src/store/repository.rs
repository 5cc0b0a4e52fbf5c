use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{info, warn};

use crate::config::LeagueSettings;
use crate::identity::{is_likely_geo_id, normalize_country_code};
use crate::render::RenderedTable;

use super::calendar::{day_index_for, monday_of, to_ymd, week_index_for};
use super::models::{
    ChallengeConfig, DailyScores, GameMode, GeoId, LeagueDay, LeagueWeek, PlayerProfile,
    PlayerUpdate, Store,
};
use super::weekly::{self, BestDaily, PodiumRow};

/// One `record_day` call. Scores merge key-wise into any existing day;
/// players upsert into the directory; challenge metadata updates per field.
#[derive(Debug, Clone)]
pub struct RecordDay {
    pub date: NaiveDate,
    pub token: String,
    pub scores: DailyScores,
    pub players: BTreeMap<GeoId, PlayerUpdate>,
    pub challenge: Option<ChallengeConfig>,
}

impl RecordDay {
    pub fn new(date: NaiveDate, token: impl Into<String>) -> Self {
        Self {
            date,
            token: token.into(),
            scores: DailyScores::new(),
            players: BTreeMap::new(),
            challenge: None,
        }
    }
}

/// File-backed league store: one JSON document, read-modify-written whole,
/// swapped into place atomically so readers never observe a partial write.
pub struct LeagueStore {
    path: PathBuf,
    settings: LeagueSettings,
}

impl LeagueStore {
    pub fn new(path: impl Into<PathBuf>, settings: LeagueSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &LeagueSettings {
        &self.settings
    }

    /// A missing file is an empty store; malformed JSON fails fast so
    /// automation halts instead of silently losing history.
    pub fn load(&self) -> Result<Store> {
        if !self.path.exists() {
            return Ok(Store::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read league store at {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed league store at {}", self.path.display()))
    }

    fn persist(&self, store: &Store) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        }

        let json =
            serde_json::to_string_pretty(store).context("Failed to serialize league store")?;

        // Write-temp-then-rename keeps the swap atomic on the same filesystem.
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to swap store into place at {}", self.path.display())
        })?;
        Ok(())
    }

    pub fn record_day(&self, params: RecordDay) -> Result<()> {
        let mut store = self.load()?;

        let week_key = to_ymd(monday_of(params.date));
        let week_index = week_index_for(&self.settings, params.date);
        let date_key = to_ymd(params.date);

        let week = store
            .weeks
            .entry(week_key.clone())
            .or_insert_with(|| LeagueWeek {
                week_start: week_key.clone(),
                week_index,
                posted_at: None,
                days: BTreeMap::new(),
            });
        week.week_index = week_index; // refreshed on every write

        // dayIndex is pinned on first assignment; announced day numbers
        // must never change on resync.
        let day = week.days.entry(date_key.clone()).or_insert_with(|| LeagueDay {
            date: date_key.clone(),
            day_index: day_index_for(&self.settings, params.date),
            token: String::new(),
            map_id: None,
            map_name: None,
            map_url: None,
            mode: None,
            round_count: None,
            time_limit: None,
            scores: DailyScores::new(),
        });

        // token: first write wins
        if day.token.is_empty() {
            day.token = params.token;
        } else if day.token != params.token && !params.token.is_empty() {
            warn!(
                "Ignoring token {} for {date_key}; day already has {}",
                params.token, day.token
            );
        }

        if let Some(challenge) = &params.challenge {
            day.apply_challenge(challenge);
        }

        let merged = params.scores.len();
        day.scores.extend(params.scores);

        for (geo_id, update) in params.players {
            let profile = store.players.entry(geo_id).or_default();
            profile.nick = update.nick;
            if let Some(country) = normalize_country_code(update.country.as_deref()) {
                profile.country = Some(country);
            }
            // discordId is only ever touched by link/unlink
        }

        info!("Recorded {date_key} (week {week_key}, {merged} scores)");
        self.persist(&store)
    }

    /// Recovers a day number from a match token (linear scan).
    pub fn day_index_by_token(&self, token: &str) -> Result<Option<i64>> {
        let store = self.load()?;
        for week in store.weeks.values() {
            for day in week.days.values() {
                if day.token == token {
                    return Ok(Some(day.day_index));
                }
            }
        }
        Ok(None)
    }

    /// The Monday before `today`'s week, when that week is recorded and its
    /// summary has not been posted yet. Gates automatic weekly posting.
    pub fn previous_week_key(&self, today: NaiveDate) -> Result<Option<String>> {
        let prev_start = monday_of(today) - Duration::days(7);
        let key = to_ymd(prev_start);

        let store = self.load()?;
        let Some(week) = store.weeks.get(&key) else {
            return Ok(None);
        };
        if week.posted_at.is_some() {
            return Ok(None);
        }
        Ok(Some(key))
    }

    /// No-op when the week does not exist.
    pub fn mark_week_as_posted(&self, week_key: &str, when: DateTime<Utc>) -> Result<()> {
        let mut store = self.load()?;
        let Some(week) = store.weeks.get_mut(week_key) else {
            return Ok(());
        };
        week.posted_at = Some(when);
        self.persist(&store)
    }

    pub fn clear_week(&self, week_key: &str) -> Result<()> {
        let mut store = self.load()?;
        if store.weeks.remove(week_key).is_some() {
            info!("Cleared week {week_key}");
        }
        self.persist(&store)
    }

    pub fn link_discord(&self, geo_id: &str, discord_id: &str) -> Result<()> {
        let geo_id = geo_id.trim();
        if !is_likely_geo_id(geo_id) {
            bail!("Not a valid player id (copy the userId, not the nick): {geo_id}");
        }

        let mut store = self.load()?;
        let profile = store.players.entry(geo_id.to_string()).or_default();
        profile.discord_id = Some(discord_id.to_string());
        self.persist(&store)
    }

    /// Clears the messaging identity; the player record itself persists.
    pub fn unlink_discord(&self, discord_id: &str) -> Result<()> {
        let mut store = self.load()?;
        for profile in store.players.values_mut() {
            if profile.discord_id.as_deref() == Some(discord_id) {
                profile.discord_id = None;
            }
        }
        self.persist(&store)
    }

    /// Identity lookups degrade to an empty directory rather than failing:
    /// name resolution must never take a summary down.
    pub fn players(&self) -> BTreeMap<GeoId, PlayerProfile> {
        self.load().map(|store| store.players).unwrap_or_default()
    }

    // --- Weekly queries ---

    /// Errors when the week is absent; call after existence is confirmed.
    pub fn build_weekly_table(&self, week_key: &str) -> Result<RenderedTable> {
        let store = self.load()?;
        let week = store
            .weeks
            .get(week_key)
            .with_context(|| format!("Week not found: {week_key}"))?;
        weekly::build_table(week, &store.players, &self.settings)
    }

    pub fn weekly_podium(&self, week_key: &str) -> Result<Vec<PodiumRow>> {
        let store = self.load()?;
        Ok(store.weeks.get(week_key).map(weekly::podium).unwrap_or_default())
    }

    pub fn weekly_perfect_attendance(&self, week_key: &str) -> Result<Vec<GeoId>> {
        let store = self.load()?;
        match store.weeks.get(week_key) {
            Some(week) => weekly::perfect_attendance(week),
            None => Ok(Vec::new()),
        }
    }

    pub fn weekly_best_daily_by_rounds(
        &self,
        week_key: &str,
        rounds: u32,
    ) -> Result<Option<BestDaily>> {
        let store = self.load()?;
        Ok(store
            .weeks
            .get(week_key)
            .and_then(|week| weekly::best_daily_by_rounds(week, rounds)))
    }

    pub fn weekly_best_daily_by_rounds_and_mode(
        &self,
        week_key: &str,
        rounds: u32,
        mode: GameMode,
    ) -> Result<Option<BestDaily>> {
        let store = self.load()?;
        Ok(store
            .weeks
            .get(week_key)
            .and_then(|week| weekly::best_daily_by_rounds_and_mode(week, rounds, mode)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> LeagueStore {
        LeagueStore::new(dir.path().join("league.json"), LeagueSettings::default())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scores(entries: &[(&str, f64)]) -> DailyScores {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert!(store.load().unwrap().weeks.is_empty());
    }

    #[test]
    fn test_record_day_places_day_under_monday_week() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let mut params = RecordDay::new(ymd(2026, 1, 14), "T1");
        params.scores = scores(&[("p1", 100.0)]);
        store.record_day(params).unwrap();

        let loaded = store.load().unwrap();
        let week = loaded.weeks.get("2026-01-12").unwrap();
        assert_eq!(week.week_index, 107);
        let day = week.days.get("2026-01-14").unwrap();
        assert_eq!(day.day_index, 745);
        assert_eq!(day.token, "T1");
    }

    #[test]
    fn test_day_index_pinned_and_token_first_write_wins() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let date = ymd(2026, 1, 12);

        store.record_day(RecordDay::new(date, "T1")).unwrap();

        // shift the epoch: a re-record must keep the originally assigned index
        let shifted = LeagueStore::new(
            dir.path().join("league.json"),
            LeagueSettings {
                day_index_start: 500,
                ..LeagueSettings::default()
            },
        );
        shifted.record_day(RecordDay::new(date, "T2")).unwrap();

        let day = shifted.load().unwrap().weeks["2026-01-12"].days["2026-01-12"].clone();
        assert_eq!(day.day_index, 743);
        assert_eq!(day.token, "T1");
    }

    #[test]
    fn test_scores_merge_union_with_later_values_winning() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let date = ymd(2026, 1, 12);

        let mut first = RecordDay::new(date, "T1");
        first.scores = scores(&[("p1", 100.0), ("p2", 200.0)]);
        store.record_day(first).unwrap();

        let mut second = RecordDay::new(date, "T1");
        second.scores = scores(&[("p2", 250.0), ("p3", 300.0)]);
        store.record_day(second).unwrap();

        let day = store.load().unwrap().weeks["2026-01-12"].days["2026-01-12"].clone();
        assert_eq!(day.scores["p1"], 100.0);
        assert_eq!(day.scores["p2"], 250.0);
        assert_eq!(day.scores["p3"], 300.0);
    }

    #[test]
    fn test_challenge_fields_fall_back_per_field() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let date = ymd(2026, 1, 12);

        let mut first = RecordDay::new(date, "T1");
        first.challenge = Some(ChallengeConfig {
            map_id: Some("world".to_string()),
            map_name: Some("A Community World".to_string()),
            mode: Some(GameMode::Nm),
            round_count: Some(5),
            time_limit: Some(30),
            ..ChallengeConfig::default()
        });
        store.record_day(first).unwrap();

        // backfill with scores only: metadata must survive untouched
        let mut second = RecordDay::new(date, "T1");
        second.scores = scores(&[("p1", 100.0)]);
        store.record_day(second).unwrap();

        let day = store.load().unwrap().weeks["2026-01-12"].days["2026-01-12"].clone();
        assert_eq!(day.map_id.as_deref(), Some("world"));
        assert_eq!(day.mode, Some(GameMode::Nm));
        assert_eq!(day.round_count, Some(5));
    }

    #[test]
    fn test_player_upsert_preserves_discord_link() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let geo_id = "5f2b3c4d5e6f708192a3b4c5";

        store.link_discord(geo_id, "123456789").unwrap();

        let mut params = RecordDay::new(ymd(2026, 1, 12), "T1");
        params.players.insert(
            geo_id.to_string(),
            PlayerUpdate {
                nick: "ana".to_string(),
                country: Some("uk".to_string()),
            },
        );
        store.record_day(params).unwrap();

        let profile = store.players()[geo_id].clone();
        assert_eq!(profile.nick, "ana");
        assert_eq!(profile.country.as_deref(), Some("GB"));
        assert_eq!(profile.discord_id.as_deref(), Some("123456789"));

        // absent country does not clear the stored one
        let mut again = RecordDay::new(ymd(2026, 1, 13), "T2");
        again.players.insert(
            geo_id.to_string(),
            PlayerUpdate {
                nick: "ana2".to_string(),
                country: None,
            },
        );
        store.record_day(again).unwrap();
        let profile = store.players()[geo_id].clone();
        assert_eq!(profile.nick, "ana2");
        assert_eq!(profile.country.as_deref(), Some("GB"));
    }

    #[test]
    fn test_link_rejects_malformed_geo_id() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert!(store.link_discord("not-an-id", "123").is_err());
    }

    #[test]
    fn test_unlink_keeps_player_record() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let geo_id = "5f2b3c4d5e6f708192a3b4c5";

        store.link_discord(geo_id, "123456789").unwrap();
        store.unlink_discord("123456789").unwrap();

        let profile = store.players()[geo_id].clone();
        assert!(profile.discord_id.is_none());
    }

    #[test]
    fn test_day_index_by_token() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        store.record_day(RecordDay::new(ymd(2026, 1, 12), "T1")).unwrap();
        store.record_day(RecordDay::new(ymd(2026, 1, 13), "T2")).unwrap();

        assert_eq!(store.day_index_by_token("T2").unwrap(), Some(744));
        assert_eq!(store.day_index_by_token("nope").unwrap(), None);
    }

    #[test]
    fn test_previous_week_key_gated_by_posted_at() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        // nothing recorded yet
        assert_eq!(store.previous_week_key(ymd(2026, 1, 19)).unwrap(), None);

        store.record_day(RecordDay::new(ymd(2026, 1, 14), "T1")).unwrap();
        assert_eq!(
            store.previous_week_key(ymd(2026, 1, 19)).unwrap(),
            Some("2026-01-12".to_string())
        );
        // any day of the following week resolves the same Monday
        assert_eq!(
            store.previous_week_key(ymd(2026, 1, 22)).unwrap(),
            Some("2026-01-12".to_string())
        );

        store.mark_week_as_posted("2026-01-12", Utc::now()).unwrap();
        assert_eq!(store.previous_week_key(ymd(2026, 1, 19)).unwrap(), None);
    }

    #[test]
    fn test_mark_week_as_posted_missing_week_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.mark_week_as_posted("2026-01-12", Utc::now()).unwrap();
        assert!(store.load().unwrap().weeks.is_empty());
    }

    #[test]
    fn test_clear_week_removes_it() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        store.record_day(RecordDay::new(ymd(2026, 1, 12), "T1")).unwrap();
        store.clear_week("2026-01-12").unwrap();
        assert!(store.load().unwrap().weeks.is_empty());
    }

    #[test]
    fn test_weekly_table_round_trip_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let mut params = RecordDay::new(ymd(2026, 1, 12), "T1");
        params.scores = scores(&[("p1", 12345.0), ("p2", 23456.0)]);
        store.record_day(params).unwrap();

        let first = store.build_weekly_table("2026-01-12").unwrap();
        let second = store.build_weekly_table("2026-01-12").unwrap();
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn test_weekly_table_errors_on_missing_week() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert!(store.build_weekly_table("2026-01-12").is_err());
    }

    #[test]
    fn test_weekly_queries_on_missing_week_are_empty() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        assert!(store.weekly_podium("2026-01-12").unwrap().is_empty());
        assert!(store.weekly_perfect_attendance("2026-01-12").unwrap().is_empty());
        assert!(store
            .weekly_best_daily_by_rounds("2026-01-12", 10)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_partial_week_podium_and_attendance() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let mut monday = RecordDay::new(ymd(2026, 1, 12), "T1");
        monday.scores = scores(&[("p1", 100.0), ("p2", 200.0)]);
        store.record_day(monday).unwrap();

        let mut tuesday = RecordDay::new(ymd(2026, 1, 13), "T2");
        tuesday.scores = scores(&[("p1", 300.0)]);
        store.record_day(tuesday).unwrap();

        let podium = store.weekly_podium("2026-01-12").unwrap();
        assert_eq!(podium.len(), 2);
        assert_eq!((podium[0].geo_id.as_str(), podium[0].total), ("p1", 400.0));
        assert_eq!((podium[1].geo_id.as_str(), podium[1].total), ("p2", 200.0));

        assert!(store.weekly_perfect_attendance("2026-01-12").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_store_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("league.json");
        fs::write(&path, "{ not json").unwrap();

        let store = LeagueStore::new(&path, LeagueSettings::default());
        assert!(store.load().is_err());
        // identity lookups degrade instead
        assert!(store.players().is_empty());
    }
}
