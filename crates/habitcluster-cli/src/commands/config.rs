use clap::Subcommand;
use habitcluster_core::{Config, HabitTracker, MemoryCheckInLog};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "streak.lookback_days", "streak.tiers.gold")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Print the whole config as TOML
    Show,
    /// Check that every habit and cluster definition is valid
    Validate,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Validate => {
            let config = Config::load()?;
            let tracker = HabitTracker::from_config(&config, MemoryCheckInLog::new())?;
            println!(
                "ok: {} habits, {} clusters",
                tracker.habits().len(),
                tracker.clusters().len()
            );
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
