//! Delete command for removing a logged entry.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// ID of the entry to delete.
    pub id: String,
}

pub fn run<W: Write>(writer: &mut W, args: &DeleteArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let Some(entry) = db
        .get_entry(&args.id)
        .with_context(|| format!("failed to load entry {}", args.id))?
    else {
        bail!("entry not found: {}", args.id);
    };
    db.delete_entry(&args.id)
        .with_context(|| format!("failed to delete entry {}", args.id))?;
    tracing::debug!(id = %args.id, exercise = %entry.exercise, "deleted entry");
    writeln!(writer, "Deleted entry {} ({})", args.id, entry.exercise)?;
    Ok(())
}
