//! Logged workout entries.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EntryId, ValidationError};

/// Category used for entries logged without a muscle group.
pub const UNCATEGORIZED: &str = "Other";

/// One logged set: an immutable fact once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    /// Unique identifier for this entry.
    pub id: EntryId,
    /// When the set was performed.
    pub date: DateTime<Utc>,
    /// Muscle group as typed by the user; may be empty.
    #[serde(default)]
    pub muscle_group: String,
    /// Exercise name, matched case-insensitively.
    pub exercise: String,
    /// Weight in pounds.
    pub weight: f64,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
}

impl WorkoutEntry {
    /// Workload for this set: weight times reps.
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }

    /// The muscle group, or [`UNCATEGORIZED`] when none was given.
    pub fn category(&self) -> &str {
        if self.muscle_group.is_empty() {
            UNCATEGORIZED
        } else {
            &self.muscle_group
        }
    }

    /// Case-insensitive exact match on the exercise name.
    pub fn is_exercise(&self, name: &str) -> bool {
        self.exercise.to_lowercase() == name.to_lowercase()
    }

    /// Case-insensitive substring match on the exercise name.
    ///
    /// `needle` is expected in lowercase (e.g. "bench" matches "Incline Bench Press").
    pub fn exercise_contains(&self, needle: &str) -> bool {
        self.exercise.to_lowercase().contains(needle)
    }

    /// Calendar day of this entry in the given time zone.
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }

    /// Re-validates an entry read back from storage or an import file.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let id = self.id.clone();
        EntryDraft {
            date: self.date,
            muscle_group: self.muscle_group,
            exercise: self.exercise,
            weight: self.weight,
            reps: self.reps,
            heart_rate: self.heart_rate,
        }
        .into_entry(id)
    }
}

/// User input for a new entry, prior to validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub date: DateTime<Utc>,
    pub muscle_group: String,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub heart_rate: Option<f64>,
}

impl EntryDraft {
    /// Validates the draft and assigns it an identifier.
    pub fn into_entry(self, id: EntryId) -> Result<WorkoutEntry, ValidationError> {
        let exercise = self.exercise.trim();
        if exercise.is_empty() {
            return Err(ValidationError::Empty { field: "exercise" });
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "weight",
                value: self.weight,
            });
        }
        if let Some(bpm) = self.heart_rate.filter(|bpm| !bpm.is_finite() || *bpm <= 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "heart rate",
                value: bpm,
            });
        }

        Ok(WorkoutEntry {
            id,
            date: self.date,
            muscle_group: self.muscle_group.trim().to_string(),
            exercise: exercise.to_string(),
            weight: self.weight,
            reps: self.reps,
            heart_rate: self.heart_rate,
        })
    }
}
