use clap::Subcommand;

use super::{open_tracker, print_json};

#[derive(Subcommand)]
pub enum HabitAction {
    /// List habits in registration order
    List,
    /// Show one habit
    Get {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        HabitAction::List => {
            let habits: Vec<_> = tracker.habits().all().collect();
            print_json(&habits)?;
        }
        HabitAction::Get { id } => {
            print_json(tracker.habit(&id)?)?;
        }
    }
    Ok(())
}
