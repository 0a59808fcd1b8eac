//! Daily and range summaries for presentation layers.
//!
//! Everything here is a fold over evaluator and streak results; lookups of
//! unknown ids fail in the lower layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::checkin::CheckInLog;
use crate::evaluator::{days_inclusive, ClusterEvaluator};
use crate::error::Result;
use crate::habit::HabitRegistry;
use crate::streak::{StreakCalculator, StreakSummary};

/// One cluster's standing on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub satisfied: bool,
    pub satisfied_count: usize,
    pub required: usize,
    pub member_count: usize,
}

/// Every cluster's status on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub clusters: BTreeMap<String, ClusterStatus>,
    pub satisfied_clusters: usize,
    pub total_clusters: usize,
    /// `satisfied_clusters / total_clusters * 100`, 0 with no clusters.
    pub percentage: f64,
}

/// One cluster over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub cluster_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub satisfied_days: usize,
    pub total_days: usize,
    pub fraction: f64,
    /// Streak as of `end`. Not clipped to the range: a run that began before
    /// `start` counts in full, so `current` and `longest` may exceed
    /// `total_days`.
    pub streak: StreakSummary,
}

/// All clusters over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeOverview {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub clusters: Vec<RangeSummary>,
    /// Days on which every cluster was satisfied.
    pub all_satisfied_days: usize,
    pub total_days: usize,
    pub completion_rate: f64,
    pub total_check_ins: usize,
    pub most_consistent_habit: Option<String>,
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Rolls cluster results into summaries.
pub struct ProgressAggregator<'a, L: CheckInLog> {
    habits: &'a HabitRegistry,
    evaluator: ClusterEvaluator<'a, L>,
    streaks: StreakCalculator<'a, L>,
}

impl<'a, L: CheckInLog> ProgressAggregator<'a, L> {
    pub fn new(
        habits: &'a HabitRegistry,
        evaluator: ClusterEvaluator<'a, L>,
        streaks: StreakCalculator<'a, L>,
    ) -> Self {
        Self {
            habits,
            evaluator,
            streaks,
        }
    }

    /// Status of every registered cluster on `date`.
    pub fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary> {
        let mut clusters = BTreeMap::new();
        let mut satisfied_clusters = 0;

        for cluster in self.evaluator.clusters().all() {
            let result = self.evaluator.evaluate_cluster(cluster, date)?;
            if result.satisfied {
                satisfied_clusters += 1;
            }
            clusters.insert(
                cluster.id.clone(),
                ClusterStatus {
                    satisfied: result.satisfied,
                    satisfied_count: result.satisfied_count,
                    required: result.required,
                    member_count: cluster.members().len(),
                },
            );
        }

        let total_clusters = clusters.len();
        Ok(DailySummary {
            date,
            clusters,
            satisfied_clusters,
            total_clusters,
            percentage: ratio(satisfied_clusters, total_clusters) * 100.0,
        })
    }

    /// Satisfied-day count and fraction for `cluster_id` in `start..=end`,
    /// plus its streak as of `end`.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn range_summary(
        &self,
        cluster_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeSummary> {
        let results = self.evaluator.evaluate_range(cluster_id, start, end)?;
        let satisfied_days = results.iter().filter(|r| r.satisfied).count();
        let total_days = results.total_days();

        let state = self.streaks.streak_state(cluster_id, start, end)?;

        Ok(RangeSummary {
            cluster_id: cluster_id.to_string(),
            start,
            end,
            satisfied_days,
            total_days,
            fraction: ratio(satisfied_days, total_days),
            streak: self.streaks.summarize(&state),
        })
    }

    /// Range summaries for every cluster plus cross-cluster totals.
    pub fn overview(&self, start: NaiveDate, end: NaiveDate) -> Result<RangeOverview> {
        let mut clusters = Vec::with_capacity(self.evaluator.clusters().len());
        let mut satisfied_by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let total_days = days_inclusive(start, end);

        for cluster in self.evaluator.clusters().all() {
            let results = self.evaluator.evaluate_cluster_range(cluster, start, end)?;
            for result in results.iter().filter(|r| r.satisfied) {
                *satisfied_by_date.entry(result.date).or_default() += 1;
            }
            clusters.push(self.range_summary(&cluster.id, start, end)?);
        }

        let cluster_count = clusters.len();
        let all_satisfied_days = if cluster_count == 0 {
            0
        } else {
            satisfied_by_date
                .values()
                .filter(|&&n| n == cluster_count)
                .count()
        };

        let events = self.evaluator.store().events_between(start, end)?;
        let mut per_habit: HashMap<&str, usize> = HashMap::new();
        for event in &events {
            *per_habit.entry(event.habit_id.as_str()).or_default() += 1;
        }
        // most check-ins wins; ties go to the earlier-registered habit
        let most_consistent_habit = per_habit
            .iter()
            .max_by(|(a_id, a_n), (b_id, b_n)| {
                a_n.cmp(b_n).then_with(|| {
                    let a_pos = self.habits.position(a_id).unwrap_or(usize::MAX);
                    let b_pos = self.habits.position(b_id).unwrap_or(usize::MAX);
                    b_pos.cmp(&a_pos)
                })
            })
            .map(|(id, _)| id.to_string());

        Ok(RangeOverview {
            start,
            end,
            clusters,
            all_satisfied_days,
            total_days,
            completion_rate: ratio(all_satisfied_days, total_days),
            total_check_ins: events.len(),
            most_consistent_habit,
        })
    }
}
