use clap::Subcommand;

use super::{open_tracker, parse_date, print_json};

#[derive(Subcommand)]
pub enum ClusterAction {
    /// List clusters with members and thresholds
    List,
    /// Satisfaction of a cluster on a date
    Status {
        /// Cluster ID
        id: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Day-by-day results over a date range
    History {
        /// Cluster ID
        id: String,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date (YYYY-MM-DD, default: today)
        #[arg(long)]
        to: Option<String>,
    },
}

pub fn run(action: ClusterAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        ClusterAction::List => {
            let clusters: Vec<_> = tracker.clusters().all().collect();
            print_json(&clusters)?;
        }
        ClusterAction::Status { id, date } => {
            let date = parse_date(date.as_deref())?;
            print_json(&tracker.cluster_status(&id, date)?)?;
        }
        ClusterAction::History { id, from, to } => {
            let start = parse_date(Some(&from))?;
            let end = parse_date(to.as_deref())?;
            let history: Vec<_> = tracker.cluster_history(&id, start, end)?.iter().collect();
            print_json(&history)?;
        }
    }
    Ok(())
}
