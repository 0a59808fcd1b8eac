mod config;
pub mod database;
pub mod migrations;

pub use config::{ClusterConfig, Config, HabitConfig};
pub use database::SqliteCheckInLog;

use std::path::PathBuf;

/// Returns `~/.config/habitcluster[-dev]/` based on HABITCLUSTER_ENV.
///
/// Set HABITCLUSTER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITCLUSTER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitcluster-dev")
    } else {
        base_dir.join("habitcluster")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
