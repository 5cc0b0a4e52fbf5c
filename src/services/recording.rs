use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::store::{LeagueStore, PlayerUpdate, RecordDay};

/// One day's results as exported by the match host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsFeed {
    pub token: String,
    /// Unix seconds of the challenge day.
    pub timestamp: i64,
    pub items: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub player_id: String,
    pub nick: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub total_score: Option<f64>,
}

pub struct RecordingService {
    config: AppConfig,
}

impl RecordingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Reads a results feed file and merges it into the store. The day is
    /// derived from the feed timestamp unless a date override is given.
    pub fn run(&self, feed_path: &Path, date_override: Option<NaiveDate>) -> Result<()> {
        info!("Recording results from {}", feed_path.display());

        let feed = self.read_feed(feed_path)?;
        let date = self.resolve_date(&feed, date_override)?;
        info!("  → {} entries for {date} (token {})", feed.items.len(), feed.token);

        let params = build_record(date, feed);
        let store = LeagueStore::new(
            self.config.storage.store_path(),
            self.config.league.clone(),
        );
        store.record_day(params)?;

        info!("Recording complete");
        Ok(())
    }

    fn read_feed(&self, path: &Path) -> Result<ResultsFeed> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read results feed at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed results feed at {}", path.display()))
    }

    fn resolve_date(&self, feed: &ResultsFeed, date_override: Option<NaiveDate>) -> Result<NaiveDate> {
        if let Some(date) = date_override {
            return Ok(date);
        }
        DateTime::<Utc>::from_timestamp(feed.timestamp, 0)
            .map(|ts| ts.date_naive())
            .with_context(|| format!("Invalid feed timestamp: {}", feed.timestamp))
    }
}

/// Missing or non-finite scores record as zero: attendance still counts even
/// when the score itself is unusable.
fn build_record(date: NaiveDate, feed: ResultsFeed) -> RecordDay {
    let mut params = RecordDay::new(date, feed.token);

    for entry in feed.items {
        let score = match entry.total_score {
            Some(score) if score.is_finite() => score,
            _ => {
                warn!("Unusable score for {} ({}); recording 0", entry.nick, entry.player_id);
                0.0
            }
        };
        params.scores.insert(entry.player_id.clone(), score);
        params.players.insert(
            entry.player_id,
            PlayerUpdate {
                nick: entry.nick,
                country: entry.country_code,
            },
        );
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_feed_parses_optional_fields() {
        let raw = r#"{
            "token": "T1",
            "timestamp": 1768262400,
            "items": [
                { "playerId": "5f2b3c4d5e6f708192a3b4c5", "nick": "ana", "countryCode": "es", "totalScore": 21500 },
                { "playerId": "6a1b2c3d4e5f60718293a4b5", "nick": "bo" }
            ]
        }"#;

        let feed: ResultsFeed = serde_json::from_str(raw).unwrap();
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].total_score, Some(21500.0));
        assert!(feed.items[1].total_score.is_none());
        assert!(feed.items[1].country_code.is_none());
    }

    #[test]
    fn test_build_record_zeroes_missing_scores() {
        let feed = ResultsFeed {
            token: "T1".to_string(),
            timestamp: 0,
            items: vec![
                FeedEntry {
                    player_id: "p1".to_string(),
                    nick: "ana".to_string(),
                    country_code: Some("es".to_string()),
                    total_score: Some(21500.0),
                },
                FeedEntry {
                    player_id: "p2".to_string(),
                    nick: "bo".to_string(),
                    country_code: None,
                    total_score: None,
                },
            ],
        };

        let params = build_record(ymd(2026, 1, 12), feed);
        assert_eq!(params.token, "T1");
        assert_eq!(params.scores["p1"], 21500.0);
        assert_eq!(params.scores["p2"], 0.0);
        assert_eq!(params.players["p1"].country.as_deref(), Some("es"));
        assert!(params.players["p2"].country.is_none());
    }

    #[test]
    fn test_feed_timestamp_resolves_utc_date() {
        // 2026-01-13 00:00:00 UTC
        let ts = DateTime::<Utc>::from_timestamp(1768262400, 0).unwrap();
        assert_eq!(ts.date_naive(), ymd(2026, 1, 13));
    }
}
