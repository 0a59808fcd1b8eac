//! # Habit Cluster Core Library
//!
//! This library provides the rules behind habit-cluster tracking: habits are
//! grouped into clusters that are satisfied on a calendar day when at least
//! `required` of their members were checked in, and streaks count runs of
//! consecutive satisfied days.
//!
//! ## Architecture
//!
//! - **Definitions**: [`HabitRegistry`] and [`ClusterDefinitionSet`], built
//!   once at startup and read-only afterwards
//! - **Check-ins**: [`CheckInStore`], the only mutable state, an idempotent
//!   per-(habit, date) log over a pluggable [`CheckInLog`] backend
//! - **Derived state**: [`ClusterEvaluator`], [`StreakCalculator`] and
//!   [`ProgressAggregator`] recompute everything from the log
//! - **Storage**: TOML configuration and a SQLite check-in log
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: the calls presentation layers use
//! - [`Config`]: habit/cluster definitions and streak settings
//! - [`SqliteCheckInLog`]: durable check-in storage

pub mod checkin;
pub mod cluster;
pub mod error;
pub mod evaluator;
pub mod habit;
pub mod progress;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use checkin::{CheckInEvent, CheckInLog, CheckInStore, MemoryCheckInLog, RecordStatus, RetractStatus};
pub use cluster::{Cluster, ClusterDefinitionSet};
pub use error::{ConfigError, CoreError, DatabaseError, NotFoundError, ValidationError};
pub use evaluator::{
    ClusterDayResult, ClusterEvaluator, DayResultCache, DayResults, DEFAULT_CACHE_CAPACITY,
};
pub use habit::{Category, Habit, HabitRegistry};
pub use progress::{ClusterStatus, DailySummary, ProgressAggregator, RangeOverview, RangeSummary};
pub use storage::{Config, SqliteCheckInLog};
pub use streak::{StreakCalculator, StreakConfig, StreakState, StreakSummary, StreakTier, StreakTiers};
pub use tracker::HabitTracker;
