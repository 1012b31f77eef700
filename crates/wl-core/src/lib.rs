//! Core domain logic for the workout log.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: validated workout sessions
//! - Awards: catalog, streaks and tiered achievement evaluation
//! - Evaluation: per-exercise progress reports and predictions
//!
//! Nothing here performs I/O. Callers pass the current time and the time
//! zone used for calendar-day bucketing explicitly.

pub mod aggregate;
mod award;
pub mod catalog;
mod entry;
pub mod evaluation;
mod streak;
pub mod types;

pub use award::{Award, AwardOutcome, AwardRule, GOAL_PLACEHOLDER, Unlock, evaluate_awards};
pub use catalog::{default_catalog, merge_with_catalog};
pub use entry::{EntryDraft, UNCATEGORIZED, WorkoutEntry};
pub use evaluation::{CategoryEvaluation, EvaluationReport, Outcome, evaluate_all, evaluate_exercise};
pub use streak::longest_streak;
pub use types::{AwardId, EntryId, Progress, ValidationError};
