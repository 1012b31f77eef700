//! Storage layer for the workout log.
//!
//! Provides persistence for workout entries and award state using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The CLI opens one `Database`
//! per process and is the only writer.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Entry dates are stored as TEXT in RFC 3339 format with a fixed microsecond
//! fraction (e.g., `2025-01-15T10:30:00.000000Z`). The fixed width means:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! Sub-microsecond precision is dropped on write.
//!
//! ## Award Storage
//!
//! Each award is stored as a JSON document in `awards.data`, keyed by its
//! catalog position. Saving replaces the whole table in one transaction.
//! When evolving the award shape:
//! - Adding fields: give them a serde default so old rows still parse
//! - Unknown rule types load as `unrecognized` and are left untouched

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use wl_core::{Award, EntryDraft, EntryId, ValidationError, WorkoutEntry};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an entry timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored entry row failed validation.
    #[error("invalid entry {entry_id}")]
    InvalidEntry {
        entry_id: String,
        #[source]
        source: ValidationError,
    },
    /// Stored award JSON could not be encoded or decoded.
    #[error("invalid award data for {title}")]
    AwardData {
        title: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An entry row as stored, before parsing and validation.
struct EntryRow {
    id: String,
    date: String,
    muscle_group: String,
    exercise: String,
    weight: f64,
    reps: u32,
    heart_rate: Option<f64>,
}

impl EntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            muscle_group: row.get(2)?,
            exercise: row.get(3)?,
            weight: row.get(4)?,
            reps: row.get(5)?,
            heart_rate: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<WorkoutEntry, DbError> {
        let date = parse_timestamp(&self.date, &self.id)?;
        let invalid = |source| DbError::InvalidEntry {
            entry_id: self.id.clone(),
            source,
        };
        let id = EntryId::new(self.id.clone()).map_err(invalid)?;
        EntryDraft {
            date,
            muscle_group: self.muscle_group,
            exercise: self.exercise,
            weight: self.weight,
            reps: self.reps,
            heart_rate: self.heart_rate,
        }
        .into_entry(id)
        .map_err(invalid)
    }
}

const ENTRY_COLUMNS: &str = "id, date, muscle_group, exercise, weight, reps, heart_rate";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Entries table: one row per logged set
            -- date: RFC 3339 with microseconds (e.g., '2025-01-15T10:30:00.000000Z')
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                muscle_group TEXT NOT NULL DEFAULT '',
                exercise TEXT NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                heart_rate REAL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);
            CREATE INDEX IF NOT EXISTS idx_entries_exercise ON entries(exercise);

            -- Award state: JSON document per award in catalog order
            CREATE TABLE IF NOT EXISTS awards (
                position INTEGER PRIMARY KEY,
                title TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Inserts an entry. Returns `false` when an entry with the same ID exists.
    pub fn insert_entry(&mut self, entry: &WorkoutEntry) -> Result<bool, DbError> {
        let inserted = self.insert_entries(std::slice::from_ref(entry))?;
        Ok(inserted == 1)
    }

    /// Inserts a batch of entries in one transaction, ignoring duplicates by ID.
    pub fn insert_entries(&mut self, entries: &[WorkoutEntry]) -> Result<usize, DbError> {
        if entries.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO entries
                (id, date, muscle_group, exercise, weight, reps, heart_rate)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for entry in entries {
                inserted += stmt.execute(params![
                    entry.id.as_str(),
                    format_timestamp(entry.date),
                    entry.muscle_group,
                    entry.exercise,
                    entry.weight,
                    entry.reps,
                    entry.heart_rate,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = entries.len(), "inserted entries");
        Ok(inserted)
    }

    /// Lists all entries ordered by date then ID.
    pub fn list_entries(&self) -> Result<Vec<WorkoutEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY date ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], EntryRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Lists entries for one exercise, most recent first.
    ///
    /// The exercise name is matched case-insensitively.
    pub fn history_for(&self, exercise: &str) -> Result<Vec<WorkoutEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY date DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], EntryRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            let entry = row?.into_entry()?;
            if entry.is_exercise(exercise) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Fetches a single entry by ID.
    pub fn get_entry(&self, id: &str) -> Result<Option<WorkoutEntry>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"),
                [id],
                EntryRow::from_row,
            )
            .optional()?;
        row.map(EntryRow::into_entry).transpose()
    }

    /// Deletes an entry. Returns `false` when no entry had that ID.
    pub fn delete_entry(&mut self, id: &str) -> Result<bool, DbError> {
        let deleted = self.conn.execute("DELETE FROM entries WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    /// Counts stored entries.
    pub fn entry_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Loads persisted award state in stored order.
    ///
    /// Returns an empty list when nothing has been saved yet.
    pub fn load_awards(&self) -> Result<Vec<Award>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT title, data FROM awards ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| {
            let title: String = row.get(0)?;
            let data: String = row.get(1)?;
            Ok((title, data))
        })?;
        let mut awards = Vec::new();
        for row in rows {
            let (title, data) = row?;
            let award = serde_json::from_str(&data)
                .map_err(|source| DbError::AwardData { title, source })?;
            awards.push(award);
        }
        Ok(awards)
    }

    /// Replaces the persisted award state.
    pub fn save_awards(&mut self, awards: &[Award]) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM awards", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO awards (position, title, data) VALUES (?, ?, ?)")?;
            for (position, award) in (0_i64..).zip(awards) {
                let data = serde_json::to_string(award).map_err(|source| DbError::AwardData {
                    title: award.title.clone(),
                    source,
                })?;
                stmt.execute(params![position, award.title, data])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = awards.len(), "saved award state");
        Ok(())
    }
}

fn parse_timestamp(timestamp: &str, entry_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entry_id: entry_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::{Duration, TimeZone};
    use wl_core::{AwardOutcome, Progress, default_catalog, evaluate_awards};

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::days(offset)
    }

    fn entry(id: &str, exercise: &str, weight: f64, reps: u32, date: DateTime<Utc>) -> WorkoutEntry {
        EntryDraft {
            date,
            muscle_group: "Legs".to_string(),
            exercise: exercise.to_string(),
            weight,
            reps,
            heart_rate: None,
        }
        .into_entry(EntryId::new(id).unwrap())
        .unwrap()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "entries"),
            vec!["id", "date", "muscle_group", "exercise", "weight", "reps", "heart_rate"]
        );
        assert_eq!(table_columns(&db.conn, "awards"), vec!["position", "title", "data"]);

        let indexes = index_names(&db.conn, "entries");
        assert!(indexes.contains("idx_entries_date"));
        assert!(indexes.contains("idx_entries_exercise"));
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    #[test]
    fn insert_entries_is_idempotent() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let squat = entry("e-1", "Squat", 225.0, 5, day(0));

        let inserted = db.insert_entries(&[squat.clone(), squat.clone()]).unwrap();
        assert_eq!(inserted, 1);
        assert!(!db.insert_entry(&squat).unwrap());
        assert_eq!(db.entry_count().unwrap(), 1);
    }

    #[test]
    fn entries_round_trip_with_all_fields() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let mut bench = entry("e-1", "Bench Press", 185.5, 8, day(0) + Duration::microseconds(250));
        bench.heart_rate = Some(142.0);
        bench.muscle_group = "Chest".to_string();

        assert!(db.insert_entry(&bench).unwrap());
        assert_eq!(db.list_entries().unwrap(), vec![bench]);
    }

    #[test]
    fn list_entries_orders_by_date_then_id() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.insert_entries(&[
            entry("b", "Squat", 225.0, 5, day(1)),
            entry("c", "Squat", 225.0, 5, day(0)),
            entry("a", "Squat", 225.0, 5, day(1)),
        ])
        .unwrap();

        let ids: Vec<String> = db
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn history_for_matches_case_insensitively_newest_first() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.insert_entries(&[
            entry("1", "Squat", 225.0, 5, day(0)),
            entry("2", "Front Squat", 135.0, 5, day(1)),
            entry("3", "SQUAT", 235.0, 5, day(2)),
        ])
        .unwrap();

        let ids: Vec<String> = db
            .history_for("squat")
            .unwrap()
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn delete_entry_reports_missing_rows() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.insert_entry(&entry("e-1", "Squat", 225.0, 5, day(0))).unwrap();

        assert!(db.delete_entry("e-1").unwrap());
        assert!(!db.delete_entry("e-1").unwrap());
        assert!(db.get_entry("e-1").unwrap().is_none());
    }

    #[test]
    fn corrupt_rows_surface_typed_errors() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.conn
            .execute(
                "INSERT INTO entries (id, date, exercise, weight, reps) VALUES ('bad', 'yesterday', 'Squat', 1, 1)",
                [],
            )
            .unwrap();
        assert!(matches!(
            db.list_entries(),
            Err(DbError::TimestampParse { ref entry_id, .. }) if entry_id == "bad"
        ));

        db.conn.execute("DELETE FROM entries", []).unwrap();
        db.conn
            .execute(
                "INSERT INTO entries (id, date, exercise, weight, reps) VALUES ('neg', '2025-01-01T00:00:00.000000Z', 'Squat', -5, 1)",
                [],
            )
            .unwrap();
        assert!(matches!(db.list_entries(), Err(DbError::InvalidEntry { .. })));
    }

    #[test]
    fn awards_round_trip_in_order() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        assert!(db.load_awards().unwrap().is_empty());

        let entries: Vec<WorkoutEntry> = (0..10)
            .map(|d| entry(&format!("e-{d}"), "Squat", 225.0, 5, day(d)))
            .collect();
        let AwardOutcome { awards, unlocked } =
            evaluate_awards(&entries, default_catalog(), day(10), &Utc);
        assert!(!unlocked.is_empty());

        db.save_awards(&awards).unwrap();
        assert_eq!(db.load_awards().unwrap(), awards);

        let mut changed = awards.clone();
        changed.truncate(2);
        changed[1].progress = Progress::COMPLETE;
        db.save_awards(&changed).unwrap();
        assert_eq!(db.load_awards().unwrap(), changed);
    }

    #[test]
    fn corrupt_award_json_is_reported() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.conn
            .execute(
                "INSERT INTO awards (position, title, data) VALUES (0, 'Broken', '{')",
                [],
            )
            .unwrap();
        assert!(matches!(
            db.load_awards(),
            Err(DbError::AwardData { ref title, .. }) if title == "Broken"
        ));
    }

    #[test]
    fn data_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wl.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_entry(&entry("e-1", "Deadlift", 405.0, 1, day(0))).unwrap();
            db.save_awards(&default_catalog()).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.entry_count().unwrap(), 1);
        assert_eq!(db.load_awards().unwrap().len(), default_catalog().len());
    }
}
