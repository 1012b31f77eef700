//! Status command for a summary of the workout log.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use wl_core::aggregate::{distinct_exercises, personal_record};
use wl_core::longest_streak;

use crate::Config;
use crate::commands::util::open_database;

/// Lifts whose personal records are summarized, as (label, name pattern).
const TRACKED_LIFTS: [(&str, &str); 3] = [
    ("Squat", "squat"),
    ("Bench", "bench"),
    ("Deadlift", "deadlift"),
];

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    write_status(writer, config, &Local)
}

fn write_status<W: Write, Tz: TimeZone>(writer: &mut W, config: &Config, tz: &Tz) -> Result<()> {
    let db = open_database(config)?;
    let count = db.entry_count().context("failed to count entries")?;

    writeln!(writer, "Workout log status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if count == 0 {
        writeln!(writer, "No entries logged.")?;
        return Ok(());
    }

    let entries = db.list_entries().context("failed to load entries")?;
    let streak = longest_streak(&entries, tz);
    writeln!(writer, "Entries: {count}")?;
    writeln!(writer, "Exercises: {}", distinct_exercises(&entries).len())?;
    writeln!(
        writer,
        "Longest streak: {streak} {}",
        if streak == 1 { "day" } else { "days" }
    )?;
    writeln!(writer, "Personal records:")?;
    for (label, pattern) in TRACKED_LIFTS {
        writeln!(writer, "- {label}: {} lbs", personal_record(&entries, pattern))?;
    }

    Ok(())
}
