//! SQLite-backed check-in log.
//!
//! One row per `(habit_id, day)`; the composite primary key plus
//! `INSERT OR IGNORE` makes recording an atomic idempotent upsert. Days are
//! stored as `num_days_from_ce` integers so SQL ordering matches date order.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{data_dir, migrations};
use crate::checkin::{CheckInEvent, CheckInLog};
use crate::error::{ConfigError, DatabaseError, Result};

/// Durable check-in log stored in SQLite.
pub struct SqliteCheckInLog {
    conn: Mutex<Connection>,
}

impl SqliteCheckInLog {
    /// Open the database at `<data_dir>/habitcluster.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let dir = data_dir().map_err(|e| ConfigError::DataDir(e.to_string()))?;
        Self::open_at(dir.join("habitcluster.db"))
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.migrate()?;
        Ok(log)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.migrate()?;
        Ok(log)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&mut self.conn())
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }
}

fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn parse_day(raw: i32) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(raw)
        .ok_or_else(|| DatabaseError::CorruptRow(format!("day {raw} out of range")).into())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow(format!("recorded_at '{raw}': {e}")).into())
}

impl CheckInLog for SqliteCheckInLog {
    fn insert(&self, event: &CheckInEvent) -> Result<bool> {
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO check_ins (habit_id, day, recorded_at)
             VALUES (?1, ?2, ?3)",
            params![
                event.habit_id,
                day_number(event.date),
                event.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn remove(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        let changed = self.conn().execute(
            "DELETE FROM check_ins WHERE habit_id = ?1 AND day = ?2",
            params![habit_id, day_number(date)],
        )?;
        Ok(changed > 0)
    }

    fn checked_in(&self, habit_ids: &[String], date: NaiveDate) -> Result<BTreeSet<String>> {
        if habit_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let placeholders = (2..habit_ids.len() + 2)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT habit_id FROM check_ins WHERE day = ?1 AND habit_id IN ({placeholders})"
        );

        let args = std::iter::once(Value::Integer(i64::from(day_number(date))))
            .chain(habit_ids.iter().map(|id| Value::Text(id.clone())));

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), |row| row.get::<_, String>(0))?;

        let mut found = BTreeSet::new();
        for row in rows {
            found.insert(row?);
        }
        Ok(found)
    }

    fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CheckInEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT habit_id, day, recorded_at FROM check_ins
             WHERE day >= ?1 AND day <= ?2
             ORDER BY day, habit_id",
        )?;
        let rows = stmt.query_map(params![day_number(start), day_number(end)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (habit_id, day, recorded_at) = row?;
            events.push(CheckInEvent {
                habit_id,
                date: parse_day(day)?,
                recorded_at: parse_timestamp(&recorded_at)?,
            });
        }
        Ok(events)
    }

    fn earliest_date(&self) -> Result<Option<NaiveDate>> {
        let raw: Option<i32> = self
            .conn()
            .query_row("SELECT MIN(day) FROM check_ins", [], |row| {
                row.get::<_, Option<i32>>(0)
            })
            .optional()?
            .flatten();
        raw.map(parse_day).transpose()
    }
}
