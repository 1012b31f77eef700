//! Log command for recording a workout set.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, SubsecRound, TimeZone, Utc};
use clap::Args;
use uuid::Uuid;
use wl_core::{EntryDraft, EntryId, WorkoutEntry};
use wl_db::Database;

use crate::Config;
use crate::commands::awards::{refresh, write_unlocks};
use crate::commands::util::{open_database, parse_datetime};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Exercise name (e.g., "Bench Press").
    pub exercise: String,

    /// Weight in pounds.
    #[arg(long)]
    pub weight: f64,

    /// Repetitions performed.
    #[arg(long)]
    pub reps: u32,

    /// Muscle group the exercise trains (e.g., "Chest").
    #[arg(long, short = 'g')]
    pub muscle_group: Option<String>,

    /// Heart rate in beats per minute.
    #[arg(long)]
    pub heart_rate: Option<f64>,

    /// When the set was performed: RFC 3339 or relative (e.g., "2 days ago").
    /// Defaults to now.
    #[arg(long)]
    pub date: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &LogArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let id = EntryId::new(Uuid::new_v4().to_string())?;
    log_entry(writer, args, &mut db, id, Utc::now(), &Local)
}

fn log_entry<W: Write, Tz: TimeZone>(
    writer: &mut W,
    args: &LogArgs,
    db: &mut Database,
    id: EntryId,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()> {
    let entry = build_entry(args, id, now)?;
    if !db.insert_entry(&entry).context("failed to store entry")? {
        bail!("entry already exists: {}", entry.id);
    }
    tracing::debug!(id = %entry.id, exercise = %entry.exercise, "logged entry");

    write!(
        writer,
        "Logged {}: {} lbs x {} on {}",
        entry.exercise,
        entry.weight,
        entry.reps,
        entry.day_in(tz)
    )?;
    if let Some(bpm) = entry.heart_rate {
        write!(writer, " at {bpm} bpm")?;
    }
    writeln!(writer, " ({})", entry.id)?;

    let outcome = refresh(db, now, tz)?;
    write_unlocks(writer, &outcome)?;
    Ok(())
}

fn build_entry(args: &LogArgs, id: EntryId, now: DateTime<Utc>) -> Result<WorkoutEntry> {
    let date = match &args.date {
        Some(raw) => parse_datetime(raw, now)?,
        None => now,
    };
    let draft = EntryDraft {
        // Stored timestamps keep microsecond precision.
        date: date.trunc_subsecs(6),
        muscle_group: args.muscle_group.clone().unwrap_or_default(),
        exercise: args.exercise.clone(),
        weight: args.weight,
        reps: args.reps,
        heart_rate: args.heart_rate,
    };
    Ok(draft.into_entry(id)?)
}
