//! Goal progress evaluation
//!
//! Turns a goal and one day's record into a `GoalProgress` snapshot: elapsed
//! time across the plan period, a coarse on-track flag for weight, and a
//! per-metric verdict for the day's intake and steps.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Goal, HealthRecord};
use crate::nutrition::{compute_intake_calories, round_to_tenth};
use super::classify::{classify_range, classify_threshold, RangeStatus, ThresholdStatus};
use super::dates::{days_between, resolve_today_in, resolve_yesterday_in};

/// Goal configuration that makes progress meaningless
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("Goal '{0}' has no start date")]
    MissingStartDate(String),

    #[error("Goal '{0}' has no end date")]
    MissingEndDate(String),
}

/// Per-metric verdicts for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAchievements {
    pub calories: RangeStatus,
    pub protein: RangeStatus,
    pub fat: RangeStatus,
    pub carbohydrate: RangeStatus,
    pub steps: ThresholdStatus,
}

impl DailyAchievements {
    /// Every metric without data
    pub fn no_data() -> Self {
        Self {
            calories: RangeStatus::NoData,
            protein: RangeStatus::NoData,
            fat: RangeStatus::NoData,
            carbohydrate: RangeStatus::NoData,
            steps: ThresholdStatus::NoData,
        }
    }

    /// Count of metrics that met their target
    pub fn met_count(&self) -> usize {
        [self.calories, self.protein, self.fat, self.carbohydrate]
            .iter()
            .filter(|s| **s == RangeStatus::Within)
            .count()
            + usize::from(self.steps == ThresholdStatus::Achieved)
    }
}

/// Progress snapshot for one goal on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal: Goal,
    pub current_weight: Option<f64>,
    pub days_remaining: i64,
    pub total_days: i64,
    pub days_elapsed: i64,
    pub progress_percentage: f64,
    pub is_on_track: bool,
    pub daily_achievements: DailyAchievements,
}

/// Evaluate `goal` for `today` against one day's `record`.
///
/// `record == None` (nothing logged for the day) is not an error: every
/// metric comes back as no data.
pub fn evaluate_progress(
    goal: &Goal,
    record: Option<&HealthRecord>,
    today: NaiveDate,
) -> Result<GoalProgress, ProgressError> {
    let start = goal
        .start_date
        .ok_or_else(|| ProgressError::MissingStartDate(goal.name.clone()))?;
    let end = goal
        .end_date
        .ok_or_else(|| ProgressError::MissingEndDate(goal.name.clone()))?;

    let total_days = days_between(end, start) + 1;
    let days_elapsed = (days_between(today, start) + 1).max(0);
    let days_remaining = days_between(end, today).max(0);

    let raw_percentage = if total_days > 0 {
        (100.0 * days_elapsed as f64 / total_days as f64).min(100.0)
    } else {
        100.0
    };

    let current_weight = record.and_then(|r| r.weight);
    let is_on_track = weight_on_track(goal.target_weight_kg, current_weight, raw_percentage / 100.0);

    Ok(GoalProgress {
        goal: goal.clone(),
        current_weight,
        days_remaining,
        total_days,
        days_elapsed,
        progress_percentage: round_to_tenth(raw_percentage),
        is_on_track,
        daily_achievements: evaluate_daily_achievements(goal, record),
    })
}

/// Coarse on-track heuristic.
///
/// Only judged once more than half the period has passed and the user is
/// still above target; the allowance shrinks linearly with elapsed time.
fn weight_on_track(target: Option<f64>, current: Option<f64>, expected_progress: f64) -> bool {
    let (Some(target), Some(current)) = (target, current) else {
        return true;
    };
    if current <= target || expected_progress <= 0.5 {
        return true;
    }
    current <= target + (current - target) * (1.0 - expected_progress)
}

/// Classify every tracked metric of `record` against the goal's bands
pub fn evaluate_daily_achievements(goal: &Goal, record: Option<&HealthRecord>) -> DailyAchievements {
    let Some(record) = record else {
        return DailyAchievements::no_data();
    };

    let intake = compute_intake_calories(record.protein_g, record.fat_g, record.carbohydrate_g);

    DailyAchievements {
        calories: classify_range(intake, goal.daily_calorie_intake_min, goal.daily_calorie_intake_max),
        protein: classify_range(record.protein_g, goal.daily_protein_min_g, goal.daily_protein_max_g),
        fat: classify_range(record.fat_g, goal.daily_fat_min_g, goal.daily_fat_max_g),
        carbohydrate: classify_range(record.carbohydrate_g, goal.daily_carb_min_g, goal.daily_carb_max_g),
        steps: classify_threshold(
            record.steps.map(|s| s as f64),
            goal.daily_steps_target.map(|t| t as f64),
        ),
    }
}

/// Pick the record to evaluate: the one dated `target`, else the most recent
pub fn select_reference_record(records: &[HealthRecord], target: NaiveDate) -> Option<&HealthRecord> {
    records
        .iter()
        .find(|r| r.date == target)
        .or_else(|| records.iter().max_by_key(|r| r.date))
}

/// Pick the goal to evaluate among several.
///
/// Inactive goals are ignored; among active ones the most recently created
/// wins, with the higher id breaking ties.
pub fn select_active_goal(goals: &[Goal]) -> Option<&Goal> {
    goals
        .iter()
        .filter(|g| g.is_active)
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
}

/// Result of `evaluate_progress_at`: the snapshot plus which day it used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProgress {
    pub reference_date: NaiveDate,
    pub record_date: Option<NaiveDate>,
    pub progress: GoalProgress,
}

/// Evaluate at an instant: "today" and "yesterday" are resolved in `offset`,
/// and yesterday's record (or the latest one) is the reference day.
pub fn evaluate_progress_at(
    goal: &Goal,
    records: &[HealthRecord],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DashboardProgress, ProgressError> {
    let today = resolve_today_in(now, offset);
    let yesterday = resolve_yesterday_in(now, offset);
    let record = select_reference_record(records, yesterday);

    Ok(DashboardProgress {
        reference_date: yesterday,
        record_date: record.map(|r| r.date),
        progress: evaluate_progress(goal, record, today)?,
    })
}
