//! Subcommands. Each opens the configured tracker and prints JSON to stdout.

pub mod checkin;
pub mod cluster;
pub mod config;
pub mod habit;
pub mod streak;
pub mod summary;

use chrono::{Local, NaiveDate};
use habitcluster_core::{Config, HabitTracker, SqliteCheckInLog};

/// Tracker built from `config.toml` over the on-disk check-in database.
pub fn open_tracker() -> Result<HabitTracker<SqliteCheckInLog>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let log = SqliteCheckInLog::open()?;
    let tracker = HabitTracker::from_config(&config, log)?;
    tracing::debug!(
        habits = tracker.habits().len(),
        clusters = tracker.clusters().len(),
        "tracker opened"
    );
    Ok(tracker)
}

/// Parse `YYYY-MM-DD`, defaulting to today's local date.
pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}").into()),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
