//! Import command for loading entries from a JSON array.
//!
//! Accepts the same format `wl export` writes. Entries whose ID is already
//! stored are skipped.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use wl_core::WorkoutEntry;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file to import. Reads stdin when omitted.
    pub file: Option<PathBuf>,
}

pub fn run<W: Write>(writer: &mut W, args: &ImportArgs, config: &Config) -> Result<()> {
    let entries = match &args.file {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            parse_entries(BufReader::new(file))?
        }
        None => parse_entries(io::stdin().lock())?,
    };

    let mut db = open_database(config)?;
    let inserted = db
        .insert_entries(&entries)
        .context("failed to store imported entries")?;
    let skipped = entries.len() - inserted;
    tracing::info!(inserted, skipped, "imported entries");

    writeln!(writer, "Imported {inserted} entries ({skipped} already present)")?;
    Ok(())
}

fn parse_entries<R: Read>(reader: R) -> Result<Vec<WorkoutEntry>> {
    let raw: Vec<WorkoutEntry> =
        serde_json::from_reader(reader).context("invalid JSON: expected an array of entries")?;
    raw.into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let id = entry.id.clone();
            entry
                .validated()
                .with_context(|| format!("invalid entry {id} at index {idx}"))
        })
        .collect()
}
