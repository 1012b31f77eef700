//! Consecutive-day streaks.

use chrono::TimeZone;

use crate::aggregate::distinct_days;
use crate::entry::WorkoutEntry;

/// Longest run of consecutive calendar days (in `tz`) with at least one entry.
///
/// Returns 0 for an empty collection and at least 1 otherwise. Multiple
/// entries on the same day count once.
pub fn longest_streak<Tz: TimeZone>(entries: &[WorkoutEntry], tz: &Tz) -> usize {
    let days = distinct_days(entries, tz);
    let mut days = days.into_iter();
    let Some(mut previous) = days.next() else {
        return 0;
    };

    let mut longest = 1;
    let mut current = 1;
    for day in days {
        if (day - previous).num_days() == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
        previous = day;
    }
    longest
}
