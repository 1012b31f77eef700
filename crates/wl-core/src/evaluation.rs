//! Per-exercise progress evaluation.
//!
//! Compares the latest session of an exercise with its history and derives
//! session deltas, a rolling-average standing, momentum and slope trends, a
//! predicted next session and a fatigue index.
//!
//! # Windows
//!
//! History is ordered most recent first. The *recent* window is the latest
//! [`RECENT_WINDOW`] sessions; the *older* window is the same length shifted
//! back by one session. Slopes are fitted against the index of the recent
//! window as ordered, so a value that has been rising over time has a
//! negative slope.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{group_by_category, history_for, in_trailing_week, linear_slope, mean, weekly_count};
use crate::award::format_amount;
use crate::entry::WorkoutEntry;

/// Sessions in the recent and older momentum windows.
pub const RECENT_WINDOW: usize = 5;
/// Previous sessions averaged for the rolling comparison.
pub const ROLLING_WINDOW: usize = 3;
/// Minimum history length before momentum and trend analysis are reported.
pub const MIN_TREND_HISTORY: usize = 4;

const HIGH_MOMENTUM: f64 = 0.15;
const POSITIVE_MOMENTUM: f64 = 0.05;
const DECLINING_MOMENTUM: f64 = -0.10;

const LIFT_SLOPE_THRESHOLD: f64 = 0.5;
const VOLUME_SLOPE_THRESHOLD: f64 = 5.0;

const WEIGHT_INCREMENT: f64 = 5.0;
const MIN_PREDICTED_WEIGHT: f64 = 5.0;
const MIN_PREDICTED_REPS: f64 = 1.0;

const TOO_FREQUENT_SESSIONS: usize = 4;
const OPTIMAL_SESSIONS: usize = 2;

const MODERATE_FATIGUE: u8 = 40;
const HIGH_FATIGUE: u8 = 70;

/// Direction of a session-over-session change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum Change {
    Increased { by: f64 },
    Decreased { by: f64 },
    Unchanged,
}

impl Change {
    fn between(latest: f64, previous: f64) -> Self {
        if latest > previous {
            Self::Increased {
                by: latest - previous,
            }
        } else if latest < previous {
            Self::Decreased {
                by: previous - latest,
            }
        } else {
            Self::Unchanged
        }
    }

    const fn is_increase(self) -> bool {
        matches!(self, Self::Increased { .. })
    }
}

/// Latest session relative to the rolling average of previous sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    AboveAverage,
    NearAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingAverage {
    pub sessions: usize,
    pub mean_weight: f64,
    pub mean_reps: f64,
    pub standing: Standing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumLevel {
    HighPositive,
    Positive,
    Stable,
    Declining,
}

impl MomentumLevel {
    fn classify(momentum: f64) -> Self {
        if momentum > HIGH_MOMENTUM {
            Self::HighPositive
        } else if momentum > POSITIVE_MOMENTUM {
            Self::Positive
        } else if momentum < DECLINING_MOMENTUM {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

/// Relative change in mean volume between the recent and older windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Momentum {
    pub value: f64,
    pub level: MomentumLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    fn classify(slope: f64, threshold: f64) -> Self {
        if slope > threshold {
            Self::Up
        } else if slope < -threshold {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub direction: TrendDirection,
}

impl Trend {
    fn fit(values: &[f64], threshold: f64) -> Self {
        let slope = linear_slope(values).unwrap_or(0.0);
        Self {
            slope,
            direction: TrendDirection::classify(slope, threshold),
        }
    }
}

/// Slope trends over the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub weight: Trend,
    pub reps: Trend,
    pub volume: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyAssessment {
    TooFrequent,
    Optimal,
    EncourageMore,
}

/// Sessions of this exercise in the trailing week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyFrequency {
    pub sessions: usize,
    pub volume: f64,
    pub assessment: FrequencyAssessment,
}

/// Suggested load for the next session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub weight: f64,
    pub reps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLevel {
    Low,
    Moderate,
    High,
}

impl FatigueLevel {
    const fn from_score(score: u8) -> Self {
        if score < MODERATE_FATIGUE {
            Self::Low
        } else if score < HIGH_FATIGUE {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Trailing-week volume relative to the recent average, on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fatigue {
    pub score: u8,
    pub level: FatigueLevel,
}

/// One-line summary chosen from the strongest signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Headline {
    StrengthAndEndurance,
    Strength,
    Endurance,
    SteadyGains,
    Dipped,
    Steady,
}

/// Everything derived from two or more sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub headline: Headline,
    pub latest_weight: f64,
    pub latest_reps: u32,
    pub previous_weight: f64,
    pub previous_reps: u32,
    pub weight: Change,
    pub reps: Change,
    pub latest_volume: f64,
    pub previous_volume: f64,
    pub rolling: RollingAverage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum: Option<Momentum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendAnalysis>,
    pub volume_record: bool,
    pub weekly: WeeklyFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    pub fatigue: Fatigue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No sessions logged for the exercise.
    NoData,
    /// Exactly one session; nothing to compare against.
    FirstSession,
    Compared(Box<Comparison>),
}

/// Evaluation of one exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub exercise: String,
    pub sessions: usize,
    pub outcome: Outcome,
}

impl EvaluationReport {
    pub fn comparison(&self) -> Option<&Comparison> {
        match &self.outcome {
            Outcome::Compared(comparison) => Some(comparison),
            Outcome::NoData | Outcome::FirstSession => None,
        }
    }
}

/// Evaluates one exercise.
///
/// `history` must hold the exercise's entries, most recent first. `now`
/// anchors the trailing-week window.
pub fn evaluate_exercise(exercise: &str, history: &[WorkoutEntry], now: DateTime<Utc>) -> EvaluationReport {
    let outcome = match history {
        [] => Outcome::NoData,
        [_] => Outcome::FirstSession,
        [latest, previous, ..] => Outcome::Compared(Box::new(compare(
            exercise, latest, previous, history, now,
        ))),
    };

    EvaluationReport {
        exercise: exercise.to_string(),
        sessions: history.len(),
        outcome,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::too_many_lines
)]
fn compare(
    exercise: &str,
    latest: &WorkoutEntry,
    previous: &WorkoutEntry,
    history: &[WorkoutEntry],
    now: DateTime<Utc>,
) -> Comparison {
    let weight = Change::between(latest.weight, previous.weight);
    let reps = Change::between(f64::from(latest.reps), f64::from(previous.reps));

    let rolling = rolling_average(latest, &history[1..]);

    let recent = &history[..history.len().min(RECENT_WINDOW)];
    let older = &history[1..history.len().min(RECENT_WINDOW + 1)];
    let recent_volumes: Vec<f64> = recent.iter().map(WorkoutEntry::volume).collect();
    let older_volumes: Vec<f64> = older.iter().map(WorkoutEntry::volume).collect();
    let recent_avg_volume = mean(&recent_volumes);

    let momentum = (history.len() >= MIN_TREND_HISTORY).then(|| {
        let older_avg = mean(&older_volumes).max(1.0);
        let value = (recent_avg_volume - older_avg) / older_avg;
        Momentum {
            value,
            level: MomentumLevel::classify(value),
        }
    });

    let weights: Vec<f64> = recent.iter().map(|e| e.weight).collect();
    let reps_series: Vec<f64> = recent.iter().map(|e| f64::from(e.reps)).collect();

    let trend = (history.len() >= MIN_TREND_HISTORY).then(|| TrendAnalysis {
        weight: Trend::fit(&weights, LIFT_SLOPE_THRESHOLD),
        reps: Trend::fit(&reps_series, LIFT_SLOPE_THRESHOLD),
        volume: Trend::fit(&recent_volumes, VOLUME_SLOPE_THRESHOLD),
    });

    let latest_volume = latest.volume();
    let best_volume = history.iter().map(WorkoutEntry::volume).fold(latest_volume, f64::max);
    let volume_record = latest_volume >= best_volume;

    let weekly = weekly_frequency(exercise, history, now);

    let prediction = match (linear_slope(&weights), linear_slope(&reps_series)) {
        (Some(weight_slope), Some(reps_slope)) => Some(Prediction {
            weight: round_to_increment(latest.weight + weight_slope).max(MIN_PREDICTED_WEIGHT),
            reps: (f64::from(latest.reps) + reps_slope).round().max(MIN_PREDICTED_REPS) as u32,
        }),
        _ => None,
    };

    let score = (weekly.volume / recent_avg_volume.max(1.0) * 10.0)
        .round()
        .clamp(0.0, 100.0) as u8;
    let fatigue = Fatigue {
        score,
        level: FatigueLevel::from_score(score),
    };

    let headline = if weight.is_increase() && latest.reps >= previous.reps {
        Headline::StrengthAndEndurance
    } else if weight.is_increase() {
        Headline::Strength
    } else if reps.is_increase() {
        Headline::Endurance
    } else {
        match momentum.map(|m| m.level) {
            Some(MomentumLevel::HighPositive | MomentumLevel::Positive) => Headline::SteadyGains,
            Some(MomentumLevel::Declining) => Headline::Dipped,
            _ => Headline::Steady,
        }
    };

    tracing::debug!(
        exercise,
        sessions = history.len(),
        fatigue = fatigue.score,
        "evaluated exercise"
    );

    Comparison {
        headline,
        latest_weight: latest.weight,
        latest_reps: latest.reps,
        previous_weight: previous.weight,
        previous_reps: previous.reps,
        weight,
        reps,
        latest_volume,
        previous_volume: previous.volume(),
        rolling,
        momentum,
        trend,
        volume_record,
        weekly,
        prediction,
        fatigue,
    }
}

fn rolling_average(latest: &WorkoutEntry, previous: &[WorkoutEntry]) -> RollingAverage {
    let window = &previous[..previous.len().min(ROLLING_WINDOW)];
    let mean_weight = mean(&window.iter().map(|e| e.weight).collect::<Vec<_>>());
    let mean_reps = mean(&window.iter().map(|e| f64::from(e.reps)).collect::<Vec<_>>());
    let standing = if latest.weight > mean_weight || f64::from(latest.reps) > mean_reps {
        Standing::AboveAverage
    } else {
        Standing::NearAverage
    };

    RollingAverage {
        sessions: window.len(),
        mean_weight,
        mean_reps,
        standing,
    }
}

fn weekly_frequency(exercise: &str, history: &[WorkoutEntry], now: DateTime<Utc>) -> WeeklyFrequency {
    let sessions = weekly_count(history, exercise, now);
    let volume = history
        .iter()
        .filter(|e| e.is_exercise(exercise) && in_trailing_week(e, now))
        .map(WorkoutEntry::volume)
        .sum();
    let assessment = if sessions >= TOO_FREQUENT_SESSIONS {
        FrequencyAssessment::TooFrequent
    } else if sessions == OPTIMAL_SESSIONS {
        FrequencyAssessment::Optimal
    } else {
        FrequencyAssessment::EncourageMore
    };

    WeeklyFrequency {
        sessions,
        volume,
        assessment,
    }
}

fn round_to_increment(weight: f64) -> f64 {
    (weight / WEIGHT_INCREMENT).round() * WEIGHT_INCREMENT
}

/// Reports for one muscle group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEvaluation {
    pub category: String,
    pub reports: Vec<EvaluationReport>,
}

/// Evaluates every exercise, grouped by muscle group.
///
/// Exercises are listed once per group under the first spelling seen,
/// sorted case-insensitively.
pub fn evaluate_all(entries: &[WorkoutEntry], now: DateTime<Utc>) -> Vec<CategoryEvaluation> {
    group_by_category(entries)
        .into_iter()
        .map(|(category, group)| {
            let mut names: BTreeMap<String, &str> = BTreeMap::new();
            for entry in group {
                names
                    .entry(entry.exercise.to_lowercase())
                    .or_insert(entry.exercise.as_str());
            }
            let reports = names
                .into_values()
                .map(|name| evaluate_exercise(name, &history_for(entries, name), now))
                .collect();
            CategoryEvaluation { category, reports }
        })
        .collect()
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exercise = &self.exercise;
        let c = match &self.outcome {
            Outcome::NoData => return write!(f, "No {exercise} sessions logged yet."),
            Outcome::FirstSession => {
                return write!(
                    f,
                    "First {exercise} session logged. Future sessions will be compared against it."
                );
            }
            Outcome::Compared(c) => c,
        };

        match c.headline {
            Headline::StrengthAndEndurance => {
                writeln!(f, "{exercise}: strength and endurance are both up.")?;
            }
            Headline::Strength => writeln!(f, "{exercise}: strength is up, nice work.")?,
            Headline::Endurance => writeln!(f, "{exercise}: endurance improved with more reps.")?,
            Headline::SteadyGains => writeln!(f, "{exercise}: steady gains, keep building.")?,
            Headline::Dipped => writeln!(f, "{exercise}: performance dipped, check recovery.")?,
            Headline::Steady => writeln!(f, "{exercise}: holding steady, a good time to focus on technique.")?,
        }

        match c.weight {
            Change::Increased { by } => writeln!(
                f,
                "- Weight up {} lbs from last session ({} vs {}).",
                format_amount(by),
                format_amount(c.latest_weight),
                format_amount(c.previous_weight)
            )?,
            Change::Decreased { by } => writeln!(
                f,
                "- Weight down {} lbs from last session ({} vs {}).",
                format_amount(by),
                format_amount(c.latest_weight),
                format_amount(c.previous_weight)
            )?,
            Change::Unchanged => writeln!(f, "- Weight unchanged at {} lbs.", format_amount(c.latest_weight))?,
        }
        match c.reps {
            Change::Increased { .. } => {
                writeln!(f, "- Reps up to {} from {}.", c.latest_reps, c.previous_reps)?;
            }
            Change::Decreased { .. } => {
                writeln!(f, "- Reps down to {} from {}.", c.latest_reps, c.previous_reps)?;
            }
            Change::Unchanged => writeln!(f, "- Reps unchanged at {}.", c.latest_reps)?,
        }

        let rolling = &c.rolling;
        let standing = match rolling.standing {
            Standing::AboveAverage => "Above",
            Standing::NearAverage => "Near",
        };
        writeln!(
            f,
            "- {standing} your recent average of {} lbs x {:.1} reps.",
            format_amount(rolling.mean_weight),
            rolling.mean_reps
        )?;

        let volume_change = c.latest_volume - c.previous_volume;
        if volume_change > 0.0 {
            writeln!(f, "- Volume up {} from last session.", format_amount(volume_change))?;
        } else if volume_change < 0.0 {
            writeln!(f, "- Volume down {} from last session.", format_amount(-volume_change))?;
        }

        if let Some(momentum) = c.momentum {
            let level = match momentum.level {
                MomentumLevel::HighPositive => "high",
                MomentumLevel::Positive => "positive",
                MomentumLevel::Stable => "stable",
                MomentumLevel::Declining => "declining",
            };
            writeln!(f, "- Momentum {level} ({:+.0}%).", momentum.value * 100.0)?;
        }
        if let Some(trend) = c.trend {
            writeln!(
                f,
                "- Trend: weight {}, reps {}, volume {}.",
                trend.weight.direction, trend.reps.direction, trend.volume.direction
            )?;
        }
        if c.volume_record {
            writeln!(f, "- New personal volume record.")?;
        }

        let sessions = c.weekly.sessions;
        match c.weekly.assessment {
            FrequencyAssessment::TooFrequent => writeln!(
                f,
                "- {sessions} sessions in the last 7 days: consider prioritizing recovery."
            )?,
            FrequencyAssessment::Optimal => writeln!(
                f,
                "- {sessions} sessions in the last 7 days: optimal for growth and recovery."
            )?,
            FrequencyAssessment::EncourageMore => writeln!(
                f,
                "- {sessions} sessions in the last 7 days: add another to boost adaptation."
            )?,
        }

        if let Some(prediction) = c.prediction {
            writeln!(
                f,
                "- Predicted next session: {} lbs x {} reps.",
                format_amount(prediction.weight),
                prediction.reps
            )?;
        }

        let advice = match c.fatigue.level {
            FatigueLevel::Low => "low, training load is fine",
            FatigueLevel::Moderate => "moderate, watch your recovery",
            FatigueLevel::High => "high, consider a rest day",
        };
        write!(f, "- Fatigue index {}/100: {advice}.", c.fatigue.score)
    }
}
