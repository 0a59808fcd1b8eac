//! TOML-based application configuration.
//!
//! Stores:
//! - Habit definitions
//! - Cluster definitions and their thresholds
//! - Streak settings (lookback limit, tier thresholds)
//!
//! Configuration is stored at `~/.config/habitcluster/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::streak::StreakConfig;

/// A habit entry in `[[habits]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitConfig {
    pub id: String,
    pub name: String,
    pub category: String,
}

/// A cluster entry in `[[clusters]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub id: String,
    pub name: String,
    pub category: String,
    pub members: Vec<String>,
    pub required: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitcluster/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub habits: Vec<HabitConfig>,
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

fn habit(id: &str, name: &str, category: &str) -> HabitConfig {
    HabitConfig {
        id: id.into(),
        name: name.into(),
        category: category.into(),
    }
}

fn cluster(id: &str, name: &str, members: &[&str], required: usize) -> ClusterConfig {
    ClusterConfig {
        id: id.into(),
        name: name.into(),
        category: id.into(),
        members: members.iter().map(|m| m.to_string()).collect(),
        required,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            streak: StreakConfig::default(),
            habits: vec![
                habit("yoga", "Yoga", "physical"),
                habit("gym", "Gym", "physical"),
                habit("jiu-jitsu", "Jiu-Jitsu", "physical"),
                habit("meditation", "Meditation", "mental"),
                habit("not-yelling", "Not Yelling", "mental"),
                habit("reading", "Reading", "growth"),
                habit("journaling", "Journaling", "growth"),
            ],
            clusters: vec![
                cluster("physical", "Physical", &["yoga", "gym", "jiu-jitsu"], 1),
                cluster("mental", "Mental", &["meditation", "not-yelling"], 2),
                cluster("growth", "Growth", &["reading", "journaling"], 1),
            ],
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                        .into(),
                ),
                // habit and cluster lists are edited in the file, not key by key
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("not a scalar setting".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::DataDir(e.to_string()))
    }

    /// Load from disk, writing and returning the default if the file is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a scalar config value by dot-separated key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not parse as
    /// the key's type, or saving fails.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_in_memory(key, value)?;
        self.save()
    }

    fn set_in_memory(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
