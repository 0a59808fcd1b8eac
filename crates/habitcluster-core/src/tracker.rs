//! The programmatic surface used by presentation layers.
//!
//! [`HabitTracker`] owns the definitions, the check-in store and the
//! day-result cache. Definitions are registered through `&mut self` during
//! startup; after that the tracker can be shared (for example behind an
//! `Arc`) and every call, check-ins included, takes `&self`.

use chrono::NaiveDate;

use crate::checkin::{CheckInLog, CheckInStore, MemoryCheckInLog, RecordStatus, RetractStatus};
use crate::cluster::{Cluster, ClusterDefinitionSet};
use crate::error::Result;
use crate::evaluator::{ClusterDayResult, ClusterEvaluator, DayResultCache, DayResults};
use crate::habit::{Category, Habit, HabitRegistry};
use crate::progress::{DailySummary, ProgressAggregator, RangeOverview, RangeSummary};
use crate::storage::Config;
use crate::streak::{StreakCalculator, StreakConfig, StreakState, StreakSummary};

/// Habit-cluster tracking core.
pub struct HabitTracker<L: CheckInLog = MemoryCheckInLog> {
    habits: HabitRegistry,
    clusters: ClusterDefinitionSet,
    store: CheckInStore<L>,
    cache: DayResultCache,
    streak_config: StreakConfig,
}

impl HabitTracker<MemoryCheckInLog> {
    /// A tracker with no definitions and an in-memory log.
    pub fn in_memory() -> Self {
        Self::new(MemoryCheckInLog::new())
    }
}

impl<L: CheckInLog> HabitTracker<L> {
    pub fn new(log: L) -> Self {
        Self {
            habits: HabitRegistry::new(),
            clusters: ClusterDefinitionSet::new(),
            store: CheckInStore::new(log),
            cache: DayResultCache::new(),
            streak_config: StreakConfig::default(),
        }
    }

    /// Build a tracker from configuration, registering every habit and then
    /// every cluster in file order.
    ///
    /// # Errors
    /// Returns the first `Validation` error encountered.
    pub fn from_config(config: &Config, log: L) -> Result<Self> {
        let mut tracker = Self::new(log).with_streak_config(config.streak.clone());
        for habit in &config.habits {
            tracker.register_habit(&habit.id, &habit.name, habit.category.as_str())?;
        }
        for cluster in &config.clusters {
            tracker.register_cluster(
                &cluster.id,
                &cluster.name,
                cluster.category.as_str(),
                cluster.members.clone(),
                cluster.required,
            )?;
        }
        tracing::debug!(
            habits = tracker.habits.len(),
            clusters = tracker.clusters.len(),
            "tracker loaded from config"
        );
        Ok(tracker)
    }

    pub fn with_streak_config(mut self, config: StreakConfig) -> Self {
        self.streak_config = config;
        self
    }

    /// # Errors
    /// `Validation` on a duplicate id or empty category.
    pub fn register_habit(
        &mut self,
        id: &str,
        name: &str,
        category: impl Into<Category>,
    ) -> Result<()> {
        match self.habits.register(id, name, category) {
            Ok(habit) => {
                tracing::debug!(habit = %habit.id, category = %habit.category, "habit registered");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(habit = id, error = %e, "habit registration rejected");
                Err(e.into())
            }
        }
    }

    /// # Errors
    /// `Validation` on a duplicate id, unknown or repeated member, or a
    /// required count outside `1..=members`.
    pub fn register_cluster(
        &mut self,
        id: &str,
        name: &str,
        category: impl Into<Category>,
        member_ids: Vec<String>,
        required: usize,
    ) -> Result<()> {
        match self
            .clusters
            .register(&self.habits, id, name, category, member_ids, required)
        {
            Ok(cluster) => {
                tracing::debug!(
                    cluster = %cluster.id,
                    members = cluster.members().len(),
                    required = cluster.required(),
                    "cluster registered"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(cluster = id, error = %e, "cluster registration rejected");
                Err(e.into())
            }
        }
    }

    /// # Errors
    /// `NotFound` if the habit is not registered.
    pub fn record_check_in(&self, habit_id: &str, date: NaiveDate) -> Result<RecordStatus> {
        let status = self.store.record(&self.habits, habit_id, date)?;
        if status == RecordStatus::Recorded {
            self.cache.invalidate(&self.clusters, habit_id, date);
        }
        Ok(status)
    }

    /// # Errors
    /// `NotFound` if the habit is not registered.
    pub fn retract_check_in(&self, habit_id: &str, date: NaiveDate) -> Result<RetractStatus> {
        let status = self.store.retract(&self.habits, habit_id, date)?;
        if status == RetractStatus::Retracted {
            self.cache.invalidate(&self.clusters, habit_id, date);
        }
        Ok(status)
    }

    /// # Errors
    /// `NotFound` if the cluster is not registered.
    pub fn cluster_status(&self, cluster_id: &str, date: NaiveDate) -> Result<ClusterDayResult> {
        self.evaluator().evaluate(cluster_id, date)
    }

    /// # Errors
    /// `NotFound` if the cluster is not registered.
    pub fn cluster_history(
        &self,
        cluster_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DayResults<'_>> {
        self.evaluator().evaluate_range(cluster_id, start, end)
    }

    /// Current and longest streak as of `as_of`, over all recorded history.
    ///
    /// # Errors
    /// `NotFound` if the cluster is not registered.
    pub fn streak(&self, cluster_id: &str, as_of: NaiveDate) -> Result<StreakSummary> {
        self.streaks().summary(cluster_id, as_of)
    }

    /// # Errors
    /// `NotFound` if the cluster is not registered.
    pub fn streak_state(
        &self,
        cluster_id: &str,
        earliest: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<StreakState> {
        self.streaks().streak_state(cluster_id, earliest, as_of)
    }

    pub fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary> {
        self.aggregator().daily_summary(date)
    }

    /// # Errors
    /// `NotFound` if the cluster is not registered.
    pub fn range_summary(
        &self,
        cluster_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeSummary> {
        self.aggregator().range_summary(cluster_id, start, end)
    }

    pub fn overview(&self, start: NaiveDate, end: NaiveDate) -> Result<RangeOverview> {
        self.aggregator().overview(start, end)
    }

    pub fn habit(&self, id: &str) -> Result<&Habit> {
        Ok(self.habits.get(id)?)
    }

    pub fn cluster(&self, id: &str) -> Result<&Cluster> {
        Ok(self.clusters.get(id)?)
    }

    pub fn habits(&self) -> &HabitRegistry {
        &self.habits
    }

    pub fn clusters(&self) -> &ClusterDefinitionSet {
        &self.clusters
    }

    pub fn store(&self) -> &CheckInStore<L> {
        &self.store
    }

    pub fn streak_config(&self) -> &StreakConfig {
        &self.streak_config
    }

    fn evaluator(&self) -> ClusterEvaluator<'_, L> {
        ClusterEvaluator::new(&self.clusters, &self.store).with_cache(&self.cache)
    }

    fn streaks(&self) -> StreakCalculator<'_, L> {
        StreakCalculator::new(self.evaluator(), &self.streak_config)
    }

    fn aggregator(&self) -> ProgressAggregator<'_, L> {
        ProgressAggregator::new(&self.habits, self.evaluator(), self.streaks())
    }
}
