//! In-memory check-in log.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{CheckInEvent, CheckInLog};
use crate::error::Result;

type Key = (NaiveDate, String);

/// Check-in log kept in a `BTreeMap` keyed by `(date, habit_id)`.
#[derive(Debug, Default)]
pub struct MemoryCheckInLog {
    events: Mutex<BTreeMap<Key, DateTime<Utc>>>,
}

impl MemoryCheckInLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<Key, DateTime<Utc>>> {
        // The map is never left half-written, so a poisoned lock is still usable.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CheckInLog for MemoryCheckInLog {
    fn insert(&self, event: &CheckInEvent) -> Result<bool> {
        let mut events = self.events();
        let key = (event.date, event.habit_id.clone());
        if events.contains_key(&key) {
            return Ok(false);
        }
        events.insert(key, event.recorded_at);
        Ok(true)
    }

    fn remove(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        Ok(self
            .events()
            .remove(&(date, habit_id.to_string()))
            .is_some())
    }

    fn checked_in(&self, habit_ids: &[String], date: NaiveDate) -> Result<BTreeSet<String>> {
        let events = self.events();
        Ok(habit_ids
            .iter()
            .filter(|id| events.contains_key(&(date, (*id).clone())))
            .cloned()
            .collect())
    }

    fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CheckInEvent>> {
        let events = self.events();
        Ok(events
            .range((start, String::new())..)
            .take_while(|((date, _), _)| *date <= end)
            .map(|((date, habit_id), recorded_at)| CheckInEvent {
                habit_id: habit_id.clone(),
                date: *date,
                recorded_at: *recorded_at,
            })
            .collect())
    }

    fn earliest_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.events().keys().next().map(|(date, _)| *date))
    }
}
