use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "daily challenge league backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Pick today's challenge from the map catalog
    Challenge {
        /// Day to plan for (defaults to today, YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Match token to record the pick under
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Record a results feed file into the league store
    Record {
        /// Path to the results feed JSON
        feed: PathBuf,
        /// Override the day derived from the feed timestamp (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print the weekly summary and ranking table
    Weekly {
        /// Week to report (any day of it; defaults to the previous unposted week)
        #[arg(short, long)]
        week_start: Option<NaiveDate>,
        /// Mark the week as posted afterwards
        #[arg(short, long)]
        mark_posted: bool,
    },
    /// Print the monthly recap
    Monthly {
        year: i32,
        month: u32,
    },
    /// Print the yearly standings
    Yearly {
        year: i32,
    },
    /// Drop a recorded week before a resync
    ClearWeek {
        /// Monday of the week to clear (YYYY-MM-DD)
        week_start: NaiveDate,
    },
    /// Attach a Discord id to a player
    Link {
        geo_id: String,
        discord_id: String,
    },
    /// Detach a Discord id from whoever holds it
    Unlink {
        discord_id: String,
    },
}
