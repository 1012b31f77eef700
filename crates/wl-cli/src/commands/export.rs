//! Export command: writes every entry as a JSON array.

use std::io::Write;

use anyhow::{Context, Result};

use crate::Config;
use crate::commands::util::open_database;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let entries = db.list_entries().context("failed to load entries")?;
    let json = serde_json::to_string_pretty(&entries).context("failed to serialize entries")?;
    writeln!(writer, "{json}")?;
    tracing::debug!(count = entries.len(), "exported entries");
    Ok(())
}
