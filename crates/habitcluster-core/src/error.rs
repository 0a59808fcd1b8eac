//! Core error types for habitcluster-core.
//!
//! Registration problems surface as [`ValidationError`], lookups of
//! unregistered ids as [`NotFoundError`]. Storage and configuration failures
//! get their own enums and are all folded into [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitcluster-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Registration-time validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Query referenced an unregistered id
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors raised while registering habits and clusters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A habit with this id is already registered
    #[error("habit '{0}' is already registered")]
    DuplicateHabit(String),

    /// A cluster with this id is already registered
    #[error("cluster '{0}' is already registered")]
    DuplicateCluster(String),

    /// Cluster references a habit that is not in the registry
    #[error("cluster '{cluster}' references unknown habit '{habit}'")]
    UnknownMember { cluster: String, habit: String },

    /// Cluster lists the same habit twice
    #[error("cluster '{cluster}' lists habit '{habit}' more than once")]
    DuplicateMember { cluster: String, habit: String },

    /// Required count outside `1..=members`
    #[error("cluster '{cluster}' requires {required} of {members} habits (must be between 1 and {members})")]
    RequiredOutOfRange {
        cluster: String,
        required: usize,
        members: usize,
    },

    /// A mandatory text field was empty
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },
}

/// Lookup of an id that was never registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("habit '{0}' is not registered")]
    Habit(String),

    #[error("cluster '{0}' is not registered")]
    Cluster(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

impl CoreError {
    /// True when the error reports an unregistered habit or cluster.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    /// True when the error came from registration-time validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_name_the_offender() {
        let err = ValidationError::UnknownMember {
            cluster: "physical".into(),
            habit: "rowing".into(),
        };
        assert_eq!(
            err.to_string(),
            "cluster 'physical' references unknown habit 'rowing'"
        );

        let err = ValidationError::RequiredOutOfRange {
            cluster: "mental".into(),
            required: 3,
            members: 2,
        };
        assert!(err.to_string().contains("requires 3 of 2"));
    }

    #[test]
    fn test_core_error_classification() {
        let not_found: CoreError = NotFoundError::Cluster("x".into()).into();
        assert!(not_found.is_not_found());
        assert!(!not_found.is_validation());

        let invalid: CoreError = ValidationError::DuplicateHabit("yoga".into()).into();
        assert!(invalid.is_validation());
    }
}
