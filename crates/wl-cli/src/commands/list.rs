//! List command for showing logged entries.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::Args;
use wl_core::WorkoutEntry;
use wl_db::Database;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show this exercise's history, most recent first.
    #[arg(long, short)]
    pub exercise: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ListArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    list_entries(writer, args, &db, &Local)
}

fn list_entries<W: Write, Tz: TimeZone>(
    writer: &mut W,
    args: &ListArgs,
    db: &Database,
    tz: &Tz,
) -> Result<()> {
    let entries = match &args.exercise {
        Some(exercise) => db.history_for(exercise),
        None => db.list_entries(),
    }
    .context("failed to load entries")?;

    if args.json {
        let json = serde_json::to_string_pretty(&entries).context("failed to serialize entries")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "No entries logged.")?;
        return Ok(());
    }

    for entry in &entries {
        writeln!(writer, "{}", format_entry(entry, tz))?;
    }
    Ok(())
}

fn format_entry<Tz: TimeZone>(entry: &WorkoutEntry, tz: &Tz) -> String {
    let mut line = format!(
        "{}  {} {} lbs x {} [{}]",
        entry.day_in(tz),
        entry.exercise,
        entry.weight,
        entry.reps,
        entry.category()
    );
    if let Some(bpm) = entry.heart_rate {
        line.push_str(&format!(" {bpm} bpm"));
    }
    line.push_str(&format!("  {}", entry.id));
    line
}
