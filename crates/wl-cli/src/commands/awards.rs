//! Awards command: re-evaluates and lists achievements.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::Args;
use wl_core::{Award, AwardOutcome, Unlock, evaluate_awards, merge_with_catalog};
use wl_db::Database;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct AwardsArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &AwardsArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    list_awards(writer, args, &mut db, Utc::now(), &Local)
}

fn list_awards<W: Write, Tz: TimeZone>(
    writer: &mut W,
    args: &AwardsArgs,
    db: &mut Database,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()> {
    let outcome = refresh(db, now, tz)?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.awards)
            .context("failed to serialize awards")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }

    write_unlocks(writer, &outcome)?;
    for award in &outcome.awards {
        write_award(writer, award, tz)?;
    }
    Ok(())
}

/// Merges stored award state with the catalog, evaluates it against every
/// entry and persists the result.
pub(crate) fn refresh<Tz: TimeZone>(
    db: &mut Database,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<AwardOutcome> {
    let entries = db.list_entries().context("failed to load entries")?;
    let stored = db.load_awards().context("failed to load award state")?;
    let outcome = evaluate_awards(&entries, merge_with_catalog(stored), now, tz);
    db.save_awards(&outcome.awards)
        .context("failed to save award state")?;
    tracing::debug!(unlocked = outcome.unlocked.len(), "refreshed awards");
    Ok(outcome)
}

/// Writes one line per tier reached in this evaluation.
pub(crate) fn write_unlocks<W: Write>(writer: &mut W, outcome: &AwardOutcome) -> Result<()> {
    for Unlock { title, tier } in &outcome.unlocked {
        let award = outcome.awards.iter().find(|a| &a.title == title);
        match award {
            Some(award) if award.max_tier > 1 => {
                writeln!(writer, "Award unlocked: {} {title} (tier {tier})", award.icon)?;
            }
            Some(award) => writeln!(writer, "Award unlocked: {} {title}", award.icon)?,
            None => writeln!(writer, "Award unlocked: {title}")?,
        }
    }
    Ok(())
}

fn write_award<W: Write, Tz: TimeZone>(writer: &mut W, award: &Award, tz: &Tz) -> Result<()> {
    let mut heading = format!("{} {}", award.icon, award.title);
    if award.max_tier > 1 {
        heading.push_str(&format!(" (tier {}/{})", award.tier, award.max_tier));
    }

    let status = if award.achieved {
        award.date_earned.map_or_else(
            || "achieved".to_string(),
            |date| format!("achieved {}", date.with_timezone(tz).date_naive()),
        )
    } else {
        match &award.progress_description {
            Some(detail) => format!("{} ({detail})", award.progress),
            None => award.progress.to_string(),
        }
    };

    writeln!(writer, "{heading}: {status}")?;
    writeln!(writer, "   {}", award.description)?;
    Ok(())
}
