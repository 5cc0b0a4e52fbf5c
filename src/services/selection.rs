use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::info;
use rand::thread_rng;

use crate::config::AppConfig;
use crate::selector::{load_catalog, recent_picks, select_daily_challenge, DailyChallenge};
use crate::store::{ChallengeConfig, LeagueStore, RecordDay};

pub struct SelectionService {
    config: AppConfig,
}

impl SelectionService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Picks today's challenge from the catalog, honoring cooldowns and the
    /// mode fairness rules against the recorded history.
    pub fn plan(&self, date: Option<NaiveDate>) -> Result<DailyChallenge> {
        let today = date.unwrap_or_else(|| Utc::now().date_naive());
        info!("Planning challenge for {today}");

        let catalog = load_catalog(&self.config.storage.maps_path())?;
        info!("  → Catalog holds {} maps", catalog.maps.len());

        let store = self.league_store();
        let recent = recent_picks(&store.load()?, self.config.selector.lookback);
        info!("  → {} recent picks considered", recent.len());

        let challenge = select_daily_challenge(
            &catalog,
            today,
            &recent,
            &self.config.selector,
            &mut thread_rng(),
        )?;
        info!(
            "  → Picked {} ({}, {} rounds, {}s)",
            challenge.map_name,
            challenge.mode.label(),
            challenge.round_count,
            challenge.time_limit
        );
        Ok(challenge)
    }

    /// Records a planned challenge under its match token so scores arriving
    /// later merge into a day that already carries the metadata.
    pub fn record_planned(
        &self,
        date: NaiveDate,
        token: &str,
        challenge: &DailyChallenge,
    ) -> Result<()> {
        let mut params = RecordDay::new(date, token);
        params.challenge = Some(ChallengeConfig::from(challenge));
        self.league_store().record_day(params)
    }

    fn league_store(&self) -> LeagueStore {
        LeagueStore::new(
            self.config.storage.store_path(),
            self.config.league.clone(),
        )
    }
}

impl From<&DailyChallenge> for ChallengeConfig {
    fn from(challenge: &DailyChallenge) -> Self {
        Self {
            map_id: Some(challenge.map_id.clone()),
            map_name: Some(challenge.map_name.clone()),
            map_url: Some(challenge.map_url.clone()),
            mode: Some(challenge.mode),
            round_count: Some(challenge.round_count),
            time_limit: Some(challenge.time_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GameMode;

    #[test]
    fn test_challenge_converts_to_full_config() {
        let challenge = DailyChallenge {
            map_id: "world".to_string(),
            map_name: "A Community World".to_string(),
            map_url: "https://example.com/maps/world".to_string(),
            mode: GameMode::Nm,
            round_count: 5,
            time_limit: 30,
        };

        let config = ChallengeConfig::from(&challenge);
        assert_eq!(config.map_id.as_deref(), Some("world"));
        assert_eq!(config.mode, Some(GameMode::Nm));
        assert_eq!(config.round_count, Some(5));
        assert_eq!(config.time_limit, Some(30));
    }
}
