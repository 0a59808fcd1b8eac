//! Streak continuity per cluster.
//!
//! A streak is the run of consecutive satisfied days ending at a reference
//! date. Any unsatisfied day breaks it; there is no grace period. Nothing here
//! is persisted: streaks are always derived from the check-in log through the
//! [`ClusterEvaluator`].

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::checkin::CheckInLog;
use crate::cluster::Cluster;
use crate::error::Result;
use crate::evaluator::ClusterEvaluator;

/// Day counts at which a current streak reaches each tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakTiers {
    #[serde(default = "default_bronze")]
    pub bronze: u32,
    #[serde(default = "default_silver")]
    pub silver: u32,
    #[serde(default = "default_gold")]
    pub gold: u32,
    #[serde(default = "default_legendary")]
    pub legendary: u32,
}

/// Streak calculation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Caps both the current and the longest streak to the last
    /// `lookback_days` days, `as_of` included. Zero (the default) disables the
    /// limit.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default)]
    pub tiers: StreakTiers,
}

fn default_lookback_days() -> u32 {
    0
}
fn default_bronze() -> u32 {
    3
}
fn default_silver() -> u32 {
    7
}
fn default_gold() -> u32 {
    30
}
fn default_legendary() -> u32 {
    100
}

impl Default for StreakTiers {
    fn default() -> Self {
        Self {
            bronze: default_bronze(),
            silver: default_silver(),
            gold: default_gold(),
            legendary: default_legendary(),
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            tiers: StreakTiers::default(),
        }
    }
}

/// Badge level for a streak length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    None,
    Bronze,
    Silver,
    Gold,
    Legendary,
}

impl StreakTiers {
    pub fn tier_for(&self, days: u32) -> StreakTier {
        if days >= self.legendary {
            StreakTier::Legendary
        } else if days >= self.gold {
            StreakTier::Gold
        } else if days >= self.silver {
            StreakTier::Silver
        } else if days >= self.bronze {
            StreakTier::Bronze
        } else {
            StreakTier::None
        }
    }
}

/// Derived streak bookkeeping for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub cluster_id: String,
    pub current: u32,
    pub longest: u32,
    pub last_evaluated_date: NaiveDate,
    pub last_satisfied_date: Option<NaiveDate>,
}

/// Current and longest streak as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    pub tier: StreakTier,
}

/// Computes streaks by walking evaluator results.
pub struct StreakCalculator<'a, L: CheckInLog> {
    evaluator: ClusterEvaluator<'a, L>,
    config: &'a StreakConfig,
}

impl<'a, L: CheckInLog> StreakCalculator<'a, L> {
    pub fn new(evaluator: ClusterEvaluator<'a, L>, config: &'a StreakConfig) -> Self {
        Self { evaluator, config }
    }

    /// Consecutive satisfied days ending at `as_of`; 0 if `as_of` itself is
    /// unsatisfied.
    ///
    /// The walk stops at the first unsatisfied day, before the earliest
    /// recorded check-in, or at the lookback limit.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn current_streak(&self, cluster_id: &str, as_of: NaiveDate) -> Result<u32> {
        let cluster = self.evaluator.clusters().get(cluster_id)?;
        self.current_for(cluster, as_of)
    }

    fn current_for(&self, cluster: &'a Cluster, as_of: NaiveDate) -> Result<u32> {
        let Some(earliest) = self.evaluator.store().earliest_date()? else {
            return Ok(0);
        };
        let floor = match self.lookback_floor(as_of) {
            Some(limit) => limit.max(earliest),
            None => earliest,
        };

        let results = self.evaluator.evaluate_cluster_range(cluster, floor, as_of)?;
        Ok(results.trailing_satisfied())
    }

    fn lookback_floor(&self, as_of: NaiveDate) -> Option<NaiveDate> {
        match self.config.lookback_days {
            0 => None,
            n => Some(
                as_of
                    .checked_sub_days(Days::new(u64::from(n) - 1))
                    .unwrap_or(NaiveDate::MIN),
            ),
        }
    }

    /// Longest run of consecutive satisfied days within `earliest..=as_of`.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn longest_streak(
        &self,
        cluster_id: &str,
        earliest: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<u32> {
        let results = self.evaluator.evaluate_range(cluster_id, earliest, as_of)?;

        let mut longest = 0;
        let mut run = 0;
        for result in &results {
            if result.satisfied {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        Ok(longest)
    }

    /// Current and longest streak plus the most recent satisfied date.
    ///
    /// `longest` is raised to `current` when the current run started before
    /// `earliest`, so `longest >= current` always holds.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn streak_state(
        &self,
        cluster_id: &str,
        earliest: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<StreakState> {
        let cluster = self.evaluator.clusters().get(cluster_id)?;
        let results = self
            .evaluator
            .evaluate_cluster_range(cluster, earliest, as_of)?;

        let mut longest = 0;
        let mut run = 0;
        let mut last_satisfied_date = None;
        for result in &results {
            if result.satisfied {
                run += 1;
                longest = longest.max(run);
                last_satisfied_date = Some(result.date);
            } else {
                run = 0;
            }
        }

        let current = self.current_for(cluster, as_of)?;
        Ok(StreakState {
            cluster_id: cluster.id.clone(),
            current,
            longest: longest.max(current),
            last_evaluated_date: as_of,
            last_satisfied_date,
        })
    }

    /// Streak as of `as_of` over the whole recorded history, or over the
    /// lookback window when one is configured.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn summary(&self, cluster_id: &str, as_of: NaiveDate) -> Result<StreakSummary> {
        let mut earliest = self
            .evaluator
            .store()
            .earliest_date()?
            .map_or(as_of, |d| d.min(as_of));
        if let Some(floor) = self.lookback_floor(as_of) {
            earliest = earliest.max(floor);
        }
        let state = self.streak_state(cluster_id, earliest, as_of)?;
        Ok(self.summarize(&state))
    }

    pub fn summarize(&self, state: &StreakState) -> StreakSummary {
        StreakSummary {
            current: state.current,
            longest: state.longest,
            tier: self.config.tiers.tier_for(state.current),
        }
    }
}
