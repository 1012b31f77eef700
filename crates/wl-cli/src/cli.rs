//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::awards::AwardsArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::evaluate::EvaluateArgs;
use crate::commands::import::ImportArgs;
use crate::commands::list::ListArgs;
use crate::commands::log::LogArgs;

/// Workout log with streaks, awards and progress analytics.
///
/// Records strength-training sets in a local database and evaluates them
/// for achievements, trends and next-session predictions.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log a workout set and check for new awards.
    Log(LogArgs),

    /// List logged entries.
    List(ListArgs),

    /// Delete a logged entry.
    Delete(DeleteArgs),

    /// Evaluate awards and show progress toward each.
    Awards(AwardsArgs),

    /// Show progress reports per exercise.
    Evaluate(EvaluateArgs),

    /// Show a summary of the log.
    Status,

    /// Import entries from a JSON array.
    Import(ImportArgs),

    /// Print all entries as a JSON array.
    Export,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_log_with_options() {
        let cli = Cli::try_parse_from([
            "wl",
            "-v",
            "log",
            "Bench Press",
            "--weight",
            "185",
            "--reps",
            "5",
            "-g",
            "Chest",
            "--date",
            "2 days ago",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Some(Commands::Log(args)) = cli.command else {
            panic!("expected log command");
        };
        assert_eq!(args.exercise, "Bench Press");
        assert_eq!(args.reps, 5);
        assert_eq!(args.muscle_group.as_deref(), Some("Chest"));
        assert_eq!(args.date.as_deref(), Some("2 days ago"));
    }

    #[test]
    fn log_requires_weight_and_reps() {
        assert!(Cli::try_parse_from(["wl", "log", "Squat", "--reps", "5"]).is_err());
        assert!(Cli::try_parse_from(["wl", "log", "Squat", "--weight", "225"]).is_err());
    }
}
