//! The fixed award catalog.

use crate::award::{Award, AwardRule};
use crate::types::AwardId;

/// Titles of the catalog awards. Titles are the stable key for persisted state.
pub mod titles {
    pub const STREAK: &str = "10-Day Streak";
    pub const BENCH_GAIN: &str = "Bench +50 lbs";
    pub const WORKOUTS: &str = "100 Workouts";
    pub const ALL_ROUNDER: &str = "All-Rounder";
    pub const GYM_RAT: &str = "Gym Rat";
    pub const THOUSAND_CLUB: &str = "1000 Lb Club";
}

fn id(value: &str) -> AwardId {
    AwardId::new(value).unwrap_or_else(|_| unreachable!("catalog ids are non-empty"))
}

/// Builds the award catalog in display order, every award unearned at tier 1.
pub fn default_catalog() -> Vec<Award> {
    vec![
        Award::new(id("streak-10"), titles::STREAK, "🔥", AwardRule::Streak { goal: 10 }, 1)
            .with_description("Workout 10 days in a row."),
        Award::new(
            id("bench-plus-50"),
            titles::BENCH_GAIN,
            "💪",
            AwardRule::TieredDelta {
                pattern: "bench".to_string(),
                base_goal: 50.0,
                template: "Increase your bench press by {goal} lbs.".to_string(),
            },
            3,
        ),
        Award::new(
            id("workouts-100"),
            titles::WORKOUTS,
            "🏆",
            AwardRule::TieredCount {
                base_goal: 100.0,
                template: "Log {goal} total workouts.".to_string(),
            },
            5,
        ),
        Award::new(
            id("all-rounder"),
            titles::ALL_ROUNDER,
            "🎯",
            AwardRule::UniqueCount { goal: 5 },
            1,
        )
        .with_description("Log 5 different exercises."),
        Award::new(id("gym-rat"), titles::GYM_RAT, "🐀", AwardRule::MonthlyDays { goal: 20 }, 1)
            .with_description("Log workouts 20 days in a single month."),
        Award::new(
            id("club-1000"),
            titles::THOUSAND_CLUB,
            "🦍",
            AwardRule::TieredSum {
                patterns: vec!["squat".to_string(), "bench".to_string(), "deadlift".to_string()],
                base_goal: 1000.0,
                unit: "lbs".to_string(),
                template: "Combined total of {goal} lbs from Deadlift, Squat and Bench Press."
                    .to_string(),
            },
            3,
        ),
    ]
}

/// Restores persisted award state onto the catalog.
///
/// Returns the catalog in its own order, substituting the stored award with
/// the same title where one exists. Stored awards the catalog no longer
/// defines are dropped.
pub fn merge_with_catalog(stored: Vec<Award>) -> Vec<Award> {
    let mut stored = stored;
    default_catalog()
        .into_iter()
        .map(|award| {
            stored
                .iter()
                .position(|s| s.title == award.title)
                .map_or(award, |idx| stored.swap_remove(idx))
        })
        .collect()
}
