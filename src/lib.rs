pub mod cli;
pub mod config;
pub mod identity;
pub mod render;
pub mod selector;
pub mod services;
pub mod stats;
pub mod store;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use cli::Cli;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::services::{RecordingService, ReportingService, SelectionService};
use crate::store::calendar::{monday_of, to_ymd};
use crate::store::LeagueStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_challenge(date: Option<NaiveDate>, token: Option<&str>) -> Result<()> {
    let service = SelectionService::new(AppConfig::new());
    let challenge = service.plan(date)?;
    println!("{}", serde_json::to_string_pretty(&challenge)?);

    if let Some(token) = token {
        let day = date.unwrap_or_else(|| Utc::now().date_naive());
        service.record_planned(day, token, &challenge)?;
    }
    Ok(())
}

pub fn handle_record(feed: &std::path::Path, date: Option<NaiveDate>) -> Result<()> {
    let service = RecordingService::new(AppConfig::new());
    service.run(feed, date)
}

pub fn handle_weekly(week_start: Option<NaiveDate>, mark_posted: bool) -> Result<()> {
    let service = ReportingService::new(AppConfig::new());
    service.weekly(week_start, mark_posted)
}

pub fn handle_monthly(year: i32, month: u32) -> Result<()> {
    let service = ReportingService::new(AppConfig::new());
    service.monthly(year, month)
}

pub fn handle_yearly(year: i32) -> Result<()> {
    let service = ReportingService::new(AppConfig::new());
    service.yearly(year)
}

pub fn handle_clear_week(week_start: NaiveDate) -> Result<()> {
    let config = AppConfig::new();
    let store = LeagueStore::new(config.storage.store_path(), config.league);
    store.clear_week(&to_ymd(monday_of(week_start)))
}

pub fn handle_link(geo_id: &str, discord_id: &str) -> Result<()> {
    let config = AppConfig::new();
    let store = LeagueStore::new(config.storage.store_path(), config.league);
    store.link_discord(geo_id, discord_id)
}

pub fn handle_unlink(discord_id: &str) -> Result<()> {
    let config = AppConfig::new();
    let store = LeagueStore::new(config.storage.store_path(), config.league);
    store.unlink_discord(discord_id)
}
