use clap::Args;

use super::{open_tracker, parse_date, print_json};

#[derive(Args)]
pub struct StreakArgs {
    /// Cluster ID
    cluster: String,
    /// Reference date (YYYY-MM-DD, default: today)
    #[arg(long)]
    as_of: Option<String>,
    /// Report full streak state from this date instead of the summary
    #[arg(long)]
    since: Option<String>,
}

pub fn run(args: StreakArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    let as_of = parse_date(args.as_of.as_deref())?;

    match args.since {
        Some(since) => {
            let earliest = parse_date(Some(&since))?;
            print_json(&tracker.streak_state(&args.cluster, earliest, as_of)?)?;
        }
        None => print_json(&tracker.streak(&args.cluster, as_of)?)?,
    }
    Ok(())
}
