//! Idempotent per-day check-in log.
//!
//! At most one event exists per `(habit_id, date)`. Recording the same pair
//! twice is a no-op reported as [`RecordStatus::AlreadyRecorded`]. Storage is
//! pluggable through [`CheckInLog`].

mod memory;

pub use memory::MemoryCheckInLog;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::habit::HabitRegistry;

/// A record that a habit was performed on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEvent {
    pub habit_id: String,
    pub date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of [`CheckInStore::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Recorded,
    AlreadyRecorded,
}

/// Outcome of [`CheckInStore::retract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetractStatus {
    Retracted,
    NotRecorded,
}

/// Storage backend for check-in events.
///
/// Implementations must make `insert` and `remove` atomic per
/// `(habit_id, date)` key so concurrent duplicate writes converge.
pub trait CheckInLog: Send + Sync {
    /// Insert unless an event for the same key exists. Returns `true` when a
    /// new event was stored.
    fn insert(&self, event: &CheckInEvent) -> Result<bool>;

    /// Remove the event for the key. Returns `true` when one was removed.
    fn remove(&self, habit_id: &str, date: NaiveDate) -> Result<bool>;

    /// The subset of `habit_ids` with an event on `date`.
    fn checked_in(&self, habit_ids: &[String], date: NaiveDate) -> Result<BTreeSet<String>>;

    /// Events with `start <= date <= end`, ordered by date then habit id.
    fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CheckInEvent>>;

    /// Date of the oldest stored event.
    fn earliest_date(&self) -> Result<Option<NaiveDate>>;
}

/// The single point of mutation for check-in state.
pub struct CheckInStore<L: CheckInLog = MemoryCheckInLog> {
    log: L,
}

impl Default for CheckInStore<MemoryCheckInLog> {
    fn default() -> Self {
        Self::new(MemoryCheckInLog::new())
    }
}

impl<L: CheckInLog> CheckInStore<L> {
    pub fn new(log: L) -> Self {
        Self { log }
    }

    /// Record that `habit_id` was done on `date`.
    ///
    /// # Errors
    /// Returns `NotFound` if the habit is not registered.
    pub fn record(
        &self,
        habits: &HabitRegistry,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<RecordStatus> {
        self.record_at(habits, habit_id, date, Utc::now())
    }

    /// Like [`record`](Self::record) with an explicit recorded timestamp.
    pub fn record_at(
        &self,
        habits: &HabitRegistry,
        habit_id: &str,
        date: NaiveDate,
        recorded_at: DateTime<Utc>,
    ) -> Result<RecordStatus> {
        habits.get(habit_id)?;

        let event = CheckInEvent {
            habit_id: habit_id.to_string(),
            date,
            recorded_at,
        };
        if self.log.insert(&event)? {
            tracing::debug!(habit = habit_id, %date, "check-in recorded");
            Ok(RecordStatus::Recorded)
        } else {
            tracing::trace!(habit = habit_id, %date, "check-in already recorded");
            Ok(RecordStatus::AlreadyRecorded)
        }
    }

    /// Remove the check-in for `(habit_id, date)` if present.
    ///
    /// # Errors
    /// Returns `NotFound` if the habit is not registered.
    pub fn retract(
        &self,
        habits: &HabitRegistry,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<RetractStatus> {
        habits.get(habit_id)?;

        if self.log.remove(habit_id, date)? {
            tracing::debug!(habit = habit_id, %date, "check-in retracted");
            Ok(RetractStatus::Retracted)
        } else {
            Ok(RetractStatus::NotRecorded)
        }
    }

    /// Habit ids among `habit_ids` that have an event on `date`.
    pub fn query(&self, habit_ids: &[String], date: NaiveDate) -> Result<BTreeSet<String>> {
        self.log.checked_in(habit_ids, date)
    }

    pub fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CheckInEvent>> {
        if start > end {
            return Ok(Vec::new());
        }
        self.log.events_between(start, end)
    }

    pub fn earliest_date(&self) -> Result<Option<NaiveDate>> {
        self.log.earliest_date()
    }

    pub fn log(&self) -> &L {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, NotFoundError};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn habits() -> HabitRegistry {
        let mut registry = HabitRegistry::new();
        registry.register("meditation", "Meditation", "mental").unwrap();
        registry.register("not-yelling", "Not Yelling", "mental").unwrap();
        registry
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_then_duplicate_is_noop() {
        let habits = habits();
        let store = CheckInStore::default();

        assert_eq!(
            store.record(&habits, "meditation", day(1)).unwrap(),
            RecordStatus::Recorded
        );
        assert_eq!(
            store.record(&habits, "meditation", day(1)).unwrap(),
            RecordStatus::AlreadyRecorded
        );
        assert_eq!(store.events_between(day(1), day(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_first_timestamp() {
        let habits = habits();
        let store = CheckInStore::default();
        let first = Utc::now() - chrono::Duration::hours(3);

        store.record_at(&habits, "meditation", day(1), first).unwrap();
        store.record(&habits, "meditation", day(1)).unwrap();

        let events = store.events_between(day(1), day(1)).unwrap();
        assert_eq!(events[0].recorded_at, first);
    }

    #[test]
    fn test_record_unknown_habit() {
        let habits = habits();
        let store = CheckInStore::default();
        let err = store.record(&habits, "yoga", day(1)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(NotFoundError::Habit(id)) if id == "yoga"));
        assert!(store.earliest_date().unwrap().is_none());
    }

    #[test]
    fn test_query_filters_by_date_and_ids() {
        let habits = habits();
        let store = CheckInStore::default();
        store.record(&habits, "meditation", day(1)).unwrap();
        store.record(&habits, "not-yelling", day(2)).unwrap();

        let on_first = store.query(&ids(&["meditation", "not-yelling"]), day(1)).unwrap();
        assert_eq!(on_first.into_iter().collect::<Vec<_>>(), ids(&["meditation"]));

        let only_yelling = store.query(&ids(&["not-yelling"]), day(1)).unwrap();
        assert!(only_yelling.is_empty());
    }

    #[test]
    fn test_retract() {
        let habits = habits();
        let store = CheckInStore::default();
        store.record(&habits, "meditation", day(1)).unwrap();

        assert_eq!(
            store.retract(&habits, "meditation", day(1)).unwrap(),
            RetractStatus::Retracted
        );
        assert_eq!(
            store.retract(&habits, "meditation", day(1)).unwrap(),
            RetractStatus::NotRecorded
        );
        assert!(store.query(&ids(&["meditation"]), day(1)).unwrap().is_empty());
    }

    #[test]
    fn test_earliest_date_and_range() {
        let habits = habits();
        let store = CheckInStore::default();
        store.record(&habits, "not-yelling", day(5)).unwrap();
        store.record(&habits, "meditation", day(3)).unwrap();
        store.record(&habits, "meditation", day(5)).unwrap();

        assert_eq!(store.earliest_date().unwrap(), Some(day(3)));

        let events = store.events_between(day(4), day(5)).unwrap();
        let keys: Vec<_> = events.iter().map(|e| (e.date, e.habit_id.as_str())).collect();
        assert_eq!(keys, vec![(day(5), "meditation"), (day(5), "not-yelling")]);

        assert!(store.events_between(day(5), day(4)).unwrap().is_empty());
    }
}
