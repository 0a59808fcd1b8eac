use clap::Subcommand;
use serde::Serialize;

use super::{open_tracker, parse_date, print_json};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Record that a habit was done
    Record {
        /// Habit ID
        habit: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a recorded check-in
    Retract {
        /// Habit ID
        habit: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List check-ins in a date range
    List {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date (YYYY-MM-DD, default: today)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Serialize)]
struct Outcome<'a, S> {
    habit: &'a str,
    date: chrono::NaiveDate,
    status: S,
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        CheckinAction::Record { habit, date } => {
            let date = parse_date(date.as_deref())?;
            let status = tracker.record_check_in(&habit, date)?;
            print_json(&Outcome {
                habit: &habit,
                date,
                status,
            })?;
        }
        CheckinAction::Retract { habit, date } => {
            let date = parse_date(date.as_deref())?;
            let status = tracker.retract_check_in(&habit, date)?;
            print_json(&Outcome {
                habit: &habit,
                date,
                status,
            })?;
        }
        CheckinAction::List { from, to } => {
            let start = parse_date(Some(&from))?;
            let end = parse_date(to.as_deref())?;
            print_json(&tracker.store().events_between(start, end)?)?;
        }
    }
    Ok(())
}
