//! Versioned schema migrations for the check-in database.
//!
//! The `schema_version` table holds the last applied version; pending steps
//! run in order each time the database is opened.

use chrono::{Datelike, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};

/// Version the database is at after [`migrate`].
pub const SCHEMA_VERSION: i32 = 2;

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// # Errors
/// Returns an error if any migration step fails; a failed step leaves the
/// database at the previous version.
pub fn migrate(conn: &mut Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )?;

    let current = schema_version(conn)?;
    if current < 1 {
        migrate_v1(conn)?;
    }
    if current < 2 {
        migrate_v2(conn)?;
    }
    Ok(())
}

/// 0 for a database that has never been migrated.
pub fn schema_version(conn: &Connection) -> SqliteResult<i32> {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i32>>(0)
    })
    .map(|v| v.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: check-ins keyed by `(habit_id, date)` with the date as `%Y-%m-%d` text.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS check_ins (
            habit_id    TEXT NOT NULL,
            date        TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            PRIMARY KEY (habit_id, date)
        );",
    )?;
    set_schema_version(conn, 1)
}

/// v2: store the date as days since 0001-01-01 (`num_days_from_ce`).
///
/// Text dates stop sorting chronologically once chrono writes a sign
/// (`+10000-01-01`), so range and `MIN` queries need the integer column.
fn migrate_v2(conn: &mut Connection) -> SqliteResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE check_ins_v2 (
            habit_id    TEXT NOT NULL,
            day         INTEGER NOT NULL,
            recorded_at TEXT NOT NULL,
            PRIMARY KEY (habit_id, day)
        );",
    )?;
    {
        let mut select = tx.prepare("SELECT habit_id, date, recorded_at FROM check_ins")?;
        let mut insert = tx.prepare(
            "INSERT INTO check_ins_v2 (habit_id, day, recorded_at) VALUES (?1, ?2, ?3)",
        )?;
        let rows = select.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (habit_id, date, recorded_at) = row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
            insert.execute(params![habit_id, date.num_days_from_ce(), recorded_at])?;
        }
    }
    tx.execute_batch(
        "DROP TABLE check_ins;
         ALTER TABLE check_ins_v2 RENAME TO check_ins;
         CREATE INDEX IF NOT EXISTS idx_check_ins_day ON check_ins(day);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reaches_current_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // running again is a no-op
        migrate(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_text_dates_converted_to_day_numbers() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY);
             INSERT INTO schema_version (version) VALUES (1);
             CREATE TABLE check_ins (
                 habit_id    TEXT NOT NULL,
                 date        TEXT NOT NULL,
                 recorded_at TEXT NOT NULL,
                 PRIMARY KEY (habit_id, date)
             );
             INSERT INTO check_ins VALUES ('yoga', '2025-06-01', '2025-06-01T08:00:00+00:00');
             INSERT INTO check_ins VALUES ('yoga', '+10000-01-01', '2025-06-01T08:00:00+00:00');",
        )
        .unwrap();

        migrate(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 2);

        let days: Vec<i32> = conn
            .prepare("SELECT day FROM check_ins ORDER BY day")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        let expected = [
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().num_days_from_ce(),
            NaiveDate::from_ymd_opt(10000, 1, 1).unwrap().num_days_from_ce(),
        ];
        assert_eq!(days, expected);
    }
}
