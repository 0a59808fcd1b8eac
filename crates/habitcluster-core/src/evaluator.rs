//! Per-day cluster satisfaction.
//!
//! Results are a pure function of the check-in log: the same log contents
//! always yield the same [`ClusterDayResult`], whatever order the check-ins
//! arrived in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::checkin::{CheckInLog, CheckInStore};
use crate::cluster::{Cluster, ClusterDefinitionSet};
use crate::error::Result;

/// Satisfaction of one cluster on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDayResult {
    pub cluster_id: String,
    pub date: NaiveDate,
    pub satisfied_count: usize,
    pub required: usize,
    pub satisfied: bool,
}

impl ClusterDayResult {
    fn new(cluster: &Cluster, date: NaiveDate, satisfied_count: usize) -> Self {
        Self {
            cluster_id: cluster.id.clone(),
            date,
            satisfied_count,
            required: cluster.required(),
            satisfied: satisfied_count >= cluster.required(),
        }
    }
}

/// Memoized day results keyed by `(cluster_id, date)`.
///
/// Entries must be invalidated on every write that touches a member habit of
/// the cluster on that date; see [`DayResultCache::invalidate`]. The cache
/// holds at most `capacity` entries and starts over once full.
#[derive(Debug)]
pub struct DayResultCache {
    entries: Mutex<HashMap<(String, NaiveDate), ClusterDayResult>>,
    // bumped by every invalidation; a result computed across a bump is not cached
    generation: AtomicU64,
    capacity: usize,
}

/// Entry limit of [`DayResultCache::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

impl Default for DayResultCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl DayResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<(String, NaiveDate), ClusterDayResult>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, cluster_id: &str, date: NaiveDate) -> Option<ClusterDayResult> {
        self.entries().get(&(cluster_id.to_string(), date)).cloned()
    }

    /// Current invalidation generation; pass it to [`insert`](Self::insert).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Cache `result` unless an invalidation happened since `seen_generation`
    /// was read. Returns whether the entry was stored.
    pub fn insert(&self, result: ClusterDayResult, seen_generation: u64) -> bool {
        let mut entries = self.entries();
        if self.generation() != seen_generation {
            return false;
        }
        let key = (result.cluster_id.clone(), result.date);
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            tracing::debug!(entries = entries.len(), "day result cache full, clearing");
            entries.clear();
        }
        entries.insert(key, result);
        true
    }

    /// Drop cached results for `date` of every cluster containing `habit_id`.
    ///
    /// Call after the write has reached the store.
    pub fn invalidate(&self, clusters: &ClusterDefinitionSet, habit_id: &str, date: NaiveDate) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut entries = self.entries();
        for cluster in clusters.clusters_containing(habit_id) {
            if entries.remove(&(cluster.id.clone(), date)).is_some() {
                tracing::trace!(cluster = %cluster.id, %date, "day result invalidated");
            }
        }
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Computes [`ClusterDayResult`]s from the check-in store.
pub struct ClusterEvaluator<'a, L: CheckInLog> {
    clusters: &'a ClusterDefinitionSet,
    store: &'a CheckInStore<L>,
    cache: Option<&'a DayResultCache>,
}

impl<L: CheckInLog> Clone for ClusterEvaluator<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: CheckInLog> Copy for ClusterEvaluator<'_, L> {}

impl<'a, L: CheckInLog> ClusterEvaluator<'a, L> {
    pub fn new(clusters: &'a ClusterDefinitionSet, store: &'a CheckInStore<L>) -> Self {
        Self {
            clusters,
            store,
            cache: None,
        }
    }

    /// Memoize single-day evaluations in `cache`.
    pub fn with_cache(mut self, cache: &'a DayResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn clusters(&self) -> &'a ClusterDefinitionSet {
        self.clusters
    }

    pub fn store(&self) -> &'a CheckInStore<L> {
        self.store
    }

    /// Evaluate `cluster_id` on `date`.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn evaluate(&self, cluster_id: &str, date: NaiveDate) -> Result<ClusterDayResult> {
        let cluster = self.clusters.get(cluster_id)?;
        self.evaluate_cluster(cluster, date)
    }

    pub(crate) fn evaluate_cluster(
        &self,
        cluster: &Cluster,
        date: NaiveDate,
    ) -> Result<ClusterDayResult> {
        if let Some(hit) = self.cache.and_then(|c| c.get(&cluster.id, date)) {
            tracing::trace!(cluster = %cluster.id, %date, "day result cache hit");
            return Ok(hit);
        }

        let generation = self.cache.map(DayResultCache::generation);
        let checked_in = self.store.query(cluster.members(), date)?;
        let result = ClusterDayResult::new(cluster, date, checked_in.len());

        if let (Some(cache), Some(generation)) = (self.cache, generation) {
            cache.insert(result.clone(), generation);
        }
        Ok(result)
    }

    /// Results for every date in `start..=end`, ascending.
    ///
    /// The cluster id is checked up front and the range's check-ins are read
    /// in a single query; the returned [`DayResults`] can be iterated any
    /// number of times. An inverted range yields nothing.
    ///
    /// # Errors
    /// Returns `NotFound` if the cluster is not registered.
    pub fn evaluate_range(
        &self,
        cluster_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DayResults<'a>> {
        let cluster = self.clusters.get(cluster_id)?;
        self.evaluate_cluster_range(cluster, start, end)
    }

    pub(crate) fn evaluate_cluster_range(
        &self,
        cluster: &'a Cluster,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DayResults<'a>> {
        let mut counts = BTreeMap::new();
        for event in self.store.events_between(start, end)? {
            if cluster.contains(&event.habit_id) {
                *counts.entry(event.date).or_insert(0usize) += 1;
            }
        }
        Ok(DayResults {
            cluster,
            start,
            end,
            counts,
        })
    }
}

/// Number of calendar days in `start..=end`; 0 when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> usize {
    if start > end {
        0
    } else {
        (end - start).num_days() as usize + 1
    }
}

/// Day-by-day results of one cluster over an inclusive date range.
#[derive(Debug, Clone)]
pub struct DayResults<'a> {
    cluster: &'a Cluster,
    start: NaiveDate,
    end: NaiveDate,
    counts: BTreeMap<NaiveDate, usize>,
}

impl<'a> DayResults<'a> {
    /// A fresh pass over the range.
    pub fn iter(&self) -> DayResultsIter<'_> {
        DayResultsIter {
            results: self,
            next: (self.start <= self.end).then_some(self.start),
        }
    }

    /// Number of days in the range.
    pub fn total_days(&self) -> usize {
        days_inclusive(self.start, self.end)
    }

    /// Consecutive satisfied days ending at the last day of the range.
    pub fn trailing_satisfied(&self) -> u32 {
        let mut run = 0;
        let mut day = self.end;
        while day >= self.start {
            if self.counts.get(&day).copied().unwrap_or(0) < self.cluster.required() {
                break;
            }
            run += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        run
    }
}

impl<'r, 'a> IntoIterator for &'r DayResults<'a> {
    type Item = ClusterDayResult;
    type IntoIter = DayResultsIter<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator produced by [`DayResults::iter`].
#[derive(Debug, Clone)]
pub struct DayResultsIter<'r> {
    results: &'r DayResults<'r>,
    next: Option<NaiveDate>,
}

impl Iterator for DayResultsIter<'_> {
    type Item = ClusterDayResult;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.next?;
        self.next = date.succ_opt().filter(|d| *d <= self.results.end);

        let count = self.results.counts.get(&date).copied().unwrap_or(0);
        Some(ClusterDayResult::new(self.results.cluster, date, count))
    }
}
