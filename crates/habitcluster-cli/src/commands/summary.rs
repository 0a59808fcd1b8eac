use chrono::Days;
use clap::Subcommand;

use super::{open_tracker, parse_date, print_json};

#[derive(Subcommand)]
pub enum SummaryAction {
    /// Every cluster's status on a date
    Day {
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// One cluster over a date range
    Range {
        /// Cluster ID
        cluster: String,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date (YYYY-MM-DD, default: today)
        #[arg(long)]
        to: Option<String>,
    },
    /// All clusters over the last N days
    Week {
        /// Last date (YYYY-MM-DD, default: today)
        #[arg(long)]
        to: Option<String>,
        /// Number of days to cover
        #[arg(long, default_value = "7")]
        days: u64,
    },
}

pub fn run(action: SummaryAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        SummaryAction::Day { date } => {
            let date = parse_date(date.as_deref())?;
            print_json(&tracker.daily_summary(date)?)?;
        }
        SummaryAction::Range { cluster, from, to } => {
            let start = parse_date(Some(&from))?;
            let end = parse_date(to.as_deref())?;
            print_json(&tracker.range_summary(&cluster, start, end)?)?;
        }
        SummaryAction::Week { to, days } => {
            if days == 0 {
                return Err("--days must be at least 1".into());
            }
            let end = parse_date(to.as_deref())?;
            let start = end
                .checked_sub_days(Days::new(days - 1))
                .ok_or("date range out of bounds")?;
            print_json(&tracker.overview(start, end)?)?;
        }
    }
    Ok(())
}
