//! Award evaluation.
//!
//! Each award carries an [`AwardRule`] describing what it measures. Evaluation
//! measures the rule against the full entry collection and updates progress,
//! achievement and tier state in place.
//!
//! # Tier Advancement
//!
//! When a tiered award reaches its goal below its top tier, it records the
//! unlock, moves to the next tier with goal `tier * base_goal` and resets to
//! not-achieved. Progress keeps the value measured against the goal that was
//! met. One evaluation advances at most one tier; the next evaluation measures
//! against the new goal.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{distinct_days, distinct_exercises, personal_record, sorted_by_date};
use crate::entry::WorkoutEntry;
use crate::streak::longest_streak;
use crate::types::{AwardId, Progress};

/// Placeholder replaced by the current goal when rendering tier descriptions.
pub const GOAL_PLACEHOLDER: &str = "{goal}";

/// What an award measures and how its goal is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AwardRule {
    /// Longest run of consecutive training days.
    Streak { goal: u32 },
    /// Total number of logged entries, with a goal that grows per tier.
    TieredCount { base_goal: f64, template: String },
    /// Weight gained between the first and last entry matching `pattern`.
    TieredDelta {
        pattern: String,
        base_goal: f64,
        template: String,
    },
    /// Sum of the personal records for each pattern.
    TieredSum {
        patterns: Vec<String>,
        base_goal: f64,
        unit: String,
        template: String,
    },
    /// Number of distinct exercises.
    UniqueCount { goal: u32 },
    /// Distinct training days in the month of the most recent entry.
    MonthlyDays { goal: u32 },
    /// A rule type this build does not know. Left untouched by evaluation.
    #[serde(other)]
    Unrecognized,
}

impl AwardRule {
    /// Per-tier goal for tiered rules.
    pub const fn base_goal(&self) -> Option<f64> {
        match self {
            Self::TieredCount { base_goal, .. }
            | Self::TieredDelta { base_goal, .. }
            | Self::TieredSum { base_goal, .. } => Some(*base_goal),
            _ => None,
        }
    }

    const fn template(&self) -> Option<&String> {
        match self {
            Self::TieredCount { template, .. }
            | Self::TieredDelta { template, .. }
            | Self::TieredSum { template, .. } => Some(template),
            _ => None,
        }
    }

    /// Fixed goal for untiered rules.
    const fn fixed_goal(&self) -> Option<u32> {
        match self {
            Self::Streak { goal } | Self::UniqueCount { goal } | Self::MonthlyDays { goal } => {
                Some(*goal)
            }
            _ => None,
        }
    }
}

/// An achievement and its evaluation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: AwardId,
    /// Stable key; unique within a collection.
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rule: AwardRule,
    #[serde(default)]
    pub achieved: bool,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_earned: Option<DateTime<Utc>>,
    pub tier: u32,
    pub max_tier: u32,
    /// Goal for the current tier. Absent for untiered awards and before the first advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_tier_goal: Option<f64>,
}

impl Award {
    /// Creates an unearned, first-tier award.
    pub fn new(id: AwardId, title: &str, icon: &str, rule: AwardRule, max_tier: u32) -> Self {
        let mut award = Self {
            id,
            title: title.to_string(),
            description: String::new(),
            icon: icon.to_string(),
            rule,
            achieved: false,
            progress: Progress::NONE,
            progress_description: None,
            date_earned: None,
            tier: 1,
            max_tier: max_tier.max(1),
            next_tier_goal: None,
        };
        award.next_tier_goal = award.rule.base_goal();
        award.description = award.render_description();
        award
    }

    /// Sets a fixed description, for untiered awards.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub const fn is_tiered(&self) -> bool {
        self.rule.base_goal().is_some()
    }

    /// Goal the award is currently measured against.
    pub fn goal(&self) -> Option<f64> {
        match self.rule.base_goal() {
            Some(base) => Some(self.next_tier_goal.unwrap_or(base)),
            None => self.rule.fixed_goal().map(f64::from),
        }
    }

    fn render_description(&self) -> String {
        match (self.rule.template(), self.goal()) {
            (Some(template), Some(goal)) => {
                template.replace(GOAL_PLACEHOLDER, &format_amount(goal))
            }
            _ => self.description.clone(),
        }
    }

    /// Moves to the next tier and re-renders the description for its goal.
    fn advance_tier(&mut self) {
        let Some(base) = self.rule.base_goal() else {
            return;
        };
        self.tier += 1;
        self.next_tier_goal = Some(f64::from(self.tier) * base);
        self.achieved = false;
        self.description = self.render_description();
    }
}

/// An award tier reached during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unlock {
    pub title: String,
    pub tier: u32,
}

/// Result of evaluating awards against an entry collection.
#[derive(Debug, Clone)]
pub struct AwardOutcome {
    /// The updated award collection, in input order.
    pub awards: Vec<Award>,
    /// Tiers reached during this evaluation, in the order they were reached.
    pub unlocked: Vec<Unlock>,
}

/// Re-evaluates every award against the full entry collection.
///
/// `now` stamps newly earned awards; `tz` defines calendar days for streaks
/// and monthly counts. With no entries the awards are returned unchanged.
pub fn evaluate_awards<Tz: TimeZone>(
    entries: &[WorkoutEntry],
    mut awards: Vec<Award>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> AwardOutcome {
    let mut unlocked = Vec::new();
    if entries.is_empty() {
        return AwardOutcome { awards, unlocked };
    }

    for award in &mut awards {
        let Some(value) = measure(&award.rule, entries, tz) else {
            tracing::debug!(title = %award.title, "award not measurable, skipping");
            continue;
        };
        apply_measurement(award, value, now, &mut unlocked);
    }

    AwardOutcome { awards, unlocked }
}

/// Measures a rule against the entries. `None` means the rule's source data is absent.
#[allow(clippy::cast_precision_loss)]
fn measure<Tz: TimeZone>(rule: &AwardRule, entries: &[WorkoutEntry], tz: &Tz) -> Option<f64> {
    match rule {
        AwardRule::Streak { .. } => Some(longest_streak(entries, tz) as f64),
        AwardRule::TieredCount { .. } => Some(entries.len() as f64),
        AwardRule::TieredDelta { pattern, .. } => {
            let pattern = pattern.to_lowercase();
            let matching: Vec<&WorkoutEntry> = sorted_by_date(entries)
                .into_iter()
                .filter(|e| e.exercise_contains(&pattern))
                .collect();
            let (first, last) = (matching.first()?, matching.last()?);
            Some((last.weight - first.weight).max(0.0))
        }
        AwardRule::TieredSum { patterns, .. } => {
            let any_match = patterns.iter().any(|p| {
                let p = p.to_lowercase();
                entries.iter().any(|e| e.exercise_contains(&p))
            });
            any_match.then(|| patterns.iter().map(|p| personal_record(entries, p)).sum())
        }
        AwardRule::UniqueCount { .. } => Some(distinct_exercises(entries).len() as f64),
        AwardRule::MonthlyDays { .. } => {
            let latest = entries.iter().max_by_key(|e| e.date)?.day_in(tz);
            let in_month = entries.iter().filter(|e| {
                let d = e.day_in(tz);
                d.year() == latest.year() && d.month() == latest.month()
            });
            Some(distinct_days(in_month, tz).len() as f64)
        }
        AwardRule::Unrecognized => None,
    }
}

/// Advances at most one tier per call. Progress keeps the value measured
/// against the goal that was met; the next call measures the new goal.
fn apply_measurement(award: &mut Award, value: f64, now: DateTime<Utc>, unlocked: &mut Vec<Unlock>) {
    let Some(goal) = award.goal() else {
        return;
    };
    award.progress = Progress::toward(value, goal);
    if let AwardRule::TieredSum { unit, .. } = &award.rule {
        award.progress_description = Some(format!(
            "{} {unit} / {} {unit}",
            format_amount(value.trunc()),
            format_amount(goal)
        ));
    }

    // Falling short never clears an earned award.
    if value < goal || award.achieved {
        return;
    }

    award.date_earned = Some(now);
    unlocked.push(Unlock {
        title: award.title.clone(),
        tier: award.tier,
    });
    tracing::info!(title = %award.title, tier = award.tier, "award unlocked");

    if award.is_tiered() && award.tier < award.max_tier {
        award.advance_tier();
    } else {
        award.achieved = true;
    }
}

/// Formats a goal or total without a trailing ".0" for whole numbers.
pub(crate) fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
