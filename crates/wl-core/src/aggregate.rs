//! Pure helpers shared by the streak, award and evaluation engines.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::entry::WorkoutEntry;

/// Length in days of the trailing window used for weekly counts and fatigue.
pub const TRAILING_WINDOW_DAYS: i64 = 7;

/// Groups entries by `key`, preserving their relative order within each group.
pub fn group_by_key<'a, K, F>(entries: &'a [WorkoutEntry], key: F) -> BTreeMap<K, Vec<&'a WorkoutEntry>>
where
    K: Ord,
    F: Fn(&WorkoutEntry) -> K,
{
    let mut groups: BTreeMap<K, Vec<&WorkoutEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(key(entry)).or_default().push(entry);
    }
    groups
}

/// Groups entries by muscle group, with blank groups under "Other".
pub fn group_by_category(entries: &[WorkoutEntry]) -> BTreeMap<String, Vec<&WorkoutEntry>> {
    group_by_key(entries, |e| e.category().to_string())
}

/// Heaviest weight logged for any exercise whose name contains `needle`.
///
/// Matching is a case-insensitive substring test, so "bench" covers
/// "Incline Bench Press". Returns 0 when nothing matches.
pub fn personal_record(entries: &[WorkoutEntry], needle: &str) -> f64 {
    let needle = needle.to_lowercase();
    entries
        .iter()
        .filter(|e| e.exercise_contains(&needle))
        .map(|e| e.weight)
        .fold(0.0, f64::max)
}

/// Number of `exercise` entries dated within the 7 days ending at `as_of`, inclusive.
pub fn weekly_count(entries: &[WorkoutEntry], exercise: &str, as_of: DateTime<Utc>) -> usize {
    entries
        .iter()
        .filter(|e| e.is_exercise(exercise) && in_trailing_week(e, as_of))
        .count()
}

/// Whether an entry falls in `[as_of - 7 days, as_of]`.
pub fn in_trailing_week(entry: &WorkoutEntry, as_of: DateTime<Utc>) -> bool {
    entry.date >= as_of - Duration::days(TRAILING_WINDOW_DAYS) && entry.date <= as_of
}

/// Ordinary least-squares slope of `values` against their index.
///
/// Returns `None` for fewer than two points.
#[allow(clippy::cast_precision_loss)]
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i as f64) * (i as f64)).sum();

    let denominator = n.mul_add(sum_xx, -(sum_x * sum_x));
    if denominator.abs() < f64::EPSILON {
        return None;
    }
    Some(n.mul_add(sum_xy, -(sum_x * sum_y)) / denominator)
}

/// Arithmetic mean with the divisor floored at 1, so an empty slice yields 0.
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

/// Calendar days (in `tz`) on which at least one entry was logged.
pub fn distinct_days<'a, Tz, I>(entries: I, tz: &Tz) -> BTreeSet<NaiveDate>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a WorkoutEntry>,
{
    entries.into_iter().map(|e| e.day_in(tz)).collect()
}

/// Distinct exercise names, lowercased.
pub fn distinct_exercises(entries: &[WorkoutEntry]) -> BTreeSet<String> {
    entries.iter().map(|e| e.exercise.to_lowercase()).collect()
}

/// Entries in chronological order. Ties keep their input order.
pub fn sorted_by_date(entries: &[WorkoutEntry]) -> Vec<&WorkoutEntry> {
    let mut sorted: Vec<&WorkoutEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date);
    sorted
}

/// Entries for one exercise, most recent first.
pub fn history_for(entries: &[WorkoutEntry], exercise: &str) -> Vec<WorkoutEntry> {
    let mut history: Vec<WorkoutEntry> = entries
        .iter()
        .filter(|e| e.is_exercise(exercise))
        .cloned()
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}
