use anyhow::Result;

use daily_league::cli::Command;
use daily_league::{
    handle_challenge, handle_clear_week, handle_link, handle_monthly, handle_record,
    handle_unlink, handle_weekly, handle_yearly, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Challenge { date, token } => handle_challenge(*date, token.as_deref()),
        Command::Record { feed, date } => handle_record(feed, *date),
        Command::Weekly {
            week_start,
            mark_posted,
        } => handle_weekly(*week_start, *mark_posted),
        Command::Monthly { year, month } => handle_monthly(*year, *month),
        Command::Yearly { year } => handle_yearly(*year),
        Command::ClearWeek { week_start } => handle_clear_week(*week_start),
        Command::Link { geo_id, discord_id } => handle_link(geo_id, discord_id),
        Command::Unlink { discord_id } => handle_unlink(discord_id),
    }
}
