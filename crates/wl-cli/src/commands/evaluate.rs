//! Evaluate command: per-exercise progress reports.
//!
//! With an exercise name, prints that exercise's report. Without one, prints
//! every exercise grouped by muscle group.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use wl_core::{evaluate_all, evaluate_exercise};
use wl_db::Database;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Exercise to evaluate. Evaluates everything when omitted.
    pub exercise: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &EvaluateArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    evaluate(writer, args, &db, Utc::now())
}

fn evaluate<W: Write>(
    writer: &mut W,
    args: &EvaluateArgs,
    db: &Database,
    now: DateTime<Utc>,
) -> Result<()> {
    match &args.exercise {
        Some(exercise) => {
            let history = db
                .history_for(exercise)
                .with_context(|| format!("failed to load history for {exercise}"))?;
            // Report under the name as it was logged.
            let name = history.first().map_or(exercise.trim(), |e| e.exercise.as_str());
            let report = evaluate_exercise(name, &history, now);
            if args.json {
                let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
                writeln!(writer, "{json}")?;
            } else {
                writeln!(writer, "{report}")?;
            }
        }
        None => {
            let entries = db.list_entries().context("failed to load entries")?;
            let groups = evaluate_all(&entries, now);
            if args.json {
                let json = serde_json::to_string_pretty(&groups).context("failed to serialize reports")?;
                writeln!(writer, "{json}")?;
                return Ok(());
            }
            if groups.is_empty() {
                writeln!(writer, "No entries logged.")?;
                return Ok(());
            }
            for (idx, group) in groups.iter().enumerate() {
                if idx > 0 {
                    writeln!(writer)?;
                }
                writeln!(writer, "== {} ==", group.category)?;
                for report in &group.reports {
                    writeln!(writer, "{report}")?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;
    use wl_core::{EntryDraft, EntryId, WorkoutEntry};

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::days(offset)
    }

    fn entry(id: &str, exercise: &str, group: &str, weight: f64, reps: u32, date: DateTime<Utc>) -> WorkoutEntry {
        EntryDraft {
            date,
            muscle_group: group.to_string(),
            exercise: exercise.to_string(),
            weight,
            reps,
            heart_rate: None,
        }
        .into_entry(EntryId::new(id).unwrap())
        .unwrap()
    }

    fn render(db: &Database, exercise: Option<&str>, json: bool, now: DateTime<Utc>) -> String {
        let args = EvaluateArgs {
            exercise: exercise.map(str::to_string),
            json,
        };
        let mut output = Vec::new();
        evaluate(&mut output, &args, db, now).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn evaluate_single_exercise() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entries(&[
            entry("1", "Bench Press", "Chest", 180.0, 5, day(0)),
            entry("2", "Bench Press", "Chest", 200.0, 5, day(1)),
        ])
        .unwrap();

        assert_snapshot!(render(&db, Some("bench press"), false, day(1)), @r"
        Bench Press: strength and endurance are both up.
        - Weight up 20 lbs from last session (200 vs 180).
        - Reps unchanged at 5.
        - Above your recent average of 180 lbs x 5.0 reps.
        - Volume up 100 from last session.
        - New personal volume record.
        - 2 sessions in the last 7 days: optimal for growth and recovery.
        - Predicted next session: 180 lbs x 5 reps.
        - Fatigue index 20/100: low, training load is fine.
        ");
    }

    #[test]
    fn evaluate_unknown_exercise() {
        let db = Database::open_in_memory().unwrap();
        assert_snapshot!(render(&db, Some("Curl"), false, day(0)), @"No Curl sessions logged yet.");
    }

    #[test]
    fn evaluate_all_groups_by_muscle_group() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entries(&[
            entry("1", "Squat", "Legs", 225.0, 5, day(0)),
            entry("2", "Bench Press", "Chest", 185.0, 5, day(0)),
            entry("3", "Squat", "Legs", 225.0, 5, day(2)),
        ])
        .unwrap();

        assert_snapshot!(render(&db, None, false, day(2)), @r"
        == Chest ==
        First Bench Press session logged. Future sessions will be compared against it.

        == Legs ==
        Squat: holding steady, a good time to focus on technique.
        - Weight unchanged at 225 lbs.
        - Reps unchanged at 5.
        - Near your recent average of 225 lbs x 5.0 reps.
        - New personal volume record.
        - 2 sessions in the last 7 days: optimal for growth and recovery.
        - Predicted next session: 225 lbs x 5 reps.
        - Fatigue index 20/100: low, training load is fine.
        ");
    }

    #[test]
    fn evaluate_json_carries_status() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("1", "Squat", "Legs", 225.0, 5, day(0))).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&render(&db, Some("Squat"), true, day(0))).unwrap();
        assert_eq!(json["outcome"]["status"], "first_session");

        let json: serde_json::Value = serde_json::from_str(&render(&db, None, true, day(0))).unwrap();
        assert_eq!(json[0]["category"], "Legs");
        assert_eq!(json[0]["reports"][0]["exercise"], "Squat");
    }
}
