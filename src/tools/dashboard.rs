//! Dashboard MCP Tools
//!
//! Read-only views combining the active goal with recorded days: progress
//! snapshot, weight trajectory, latest metrics and goal-vs-actual series.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Goal, HealthRecord, SortOrder};
use crate::nutrition::{compute_intake_calories, compute_macro_ratio, round_to_tenth, MacroRatio};
use crate::progress::dates::{add_days, resolve_today_in, resolve_yesterday_in};
use crate::progress::{
    evaluate_daily_achievements, evaluate_progress_at, generate_trajectory, DailyAchievements,
    DashboardProgress, GoalProgress, RangeStatus, ThresholdStatus, TrajectoryDirection,
    WeightTrajectoryPoint,
};
use crate::storage::{FindManyOptions, Stores};
use super::goals::get_active_goal;

// ============================================================================
// Response Types
// ============================================================================

/// Response for get_goal_progress
#[derive(Debug, Serialize)]
pub struct GoalProgressResponse {
    /// Day the snapshot is meant to describe ("yesterday")
    pub reference_date: NaiveDate,
    /// Day of the record actually used, if any
    pub record_date: Option<NaiveDate>,
    /// True when yesterday had no record and the latest one was used
    pub used_fallback_record: bool,
    pub achievements_met: usize,
    pub progress: GoalProgress,
}

impl From<DashboardProgress> for GoalProgressResponse {
    fn from(result: DashboardProgress) -> Self {
        Self {
            reference_date: result.reference_date,
            record_date: result.record_date,
            used_fallback_record: result
                .record_date
                .map_or(false, |d| d != result.reference_date),
            achievements_met: result.progress.daily_achievements.met_count(),
            progress: result.progress,
        }
    }
}

/// A recorded weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightSample {
    pub date: NaiveDate,
    pub weight: f64,
}

/// Response for get_weight_trajectory
#[derive(Debug, Serialize)]
pub struct WeightTrajectoryResponse {
    pub goal_id: i64,
    pub goal_name: String,
    pub today: NaiveDate,
    pub window_days: u32,
    pub start_weight: Option<f64>,
    pub direction: Option<TrajectoryDirection>,
    /// kg per day; positive means losing
    pub daily_change: Option<f64>,
    pub points: Vec<WeightTrajectoryPoint>,
    pub actual: Vec<WeightSample>,
}

/// Response for get_latest_metrics
#[derive(Debug, Serialize)]
pub struct LatestMetrics {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    /// Against the previous record; `None` unless both days were weighed
    pub weight_change: Option<f64>,
    pub previous_date: Option<NaiveDate>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub steps: Option<i64>,
    pub total_calories: Option<i64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub intake_calories: Option<f64>,
    pub macro_ratio: Option<MacroRatio>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// The goal's daily targets
#[derive(Debug, Serialize)]
pub struct GoalBands {
    pub calories: Band,
    pub protein_g: Band,
    pub fat_g: Band,
    pub carbohydrate_g: Band,
    pub steps_target: Option<i64>,
}

impl GoalBands {
    fn of(goal: &Goal) -> Self {
        Self {
            calories: Band {
                min: goal.daily_calorie_intake_min,
                max: goal.daily_calorie_intake_max,
            },
            protein_g: Band {
                min: goal.daily_protein_min_g,
                max: goal.daily_protein_max_g,
            },
            fat_g: Band {
                min: goal.daily_fat_min_g,
                max: goal.daily_fat_max_g,
            },
            carbohydrate_g: Band {
                min: goal.daily_carb_min_g,
                max: goal.daily_carb_max_g,
            },
            steps_target: goal.daily_steps_target,
        }
    }
}

/// One day of actual intake and activity next to its verdicts
#[derive(Debug, Serialize)]
pub struct ComparisonDay {
    pub date: NaiveDate,
    pub intake_calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub steps: Option<i64>,
    pub achievements: DailyAchievements,
}

/// Days within band per metric, over the recorded days in the window
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub days_recorded: usize,
    pub calories_within: usize,
    pub protein_within: usize,
    pub fat_within: usize,
    pub carbohydrate_within: usize,
    pub steps_achieved: usize,
}

/// Response for get_goal_comparison
#[derive(Debug, Serialize)]
pub struct GoalComparisonResponse {
    pub goal_id: i64,
    pub goal_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub bands: GoalBands,
    pub days: Vec<ComparisonDay>,
    pub summary: ComparisonSummary,
}

// ============================================================================
// Helpers
// ============================================================================

/// Every stored record, oldest first
pub(crate) fn load_history(stores: &Stores) -> Result<Vec<HealthRecord>, String> {
    stores
        .records
        .find_many(&FindManyOptions {
            limit: i64::MAX,
            offset: 0,
            order: SortOrder::Asc,
        })
        .map_err(|e| format!("Failed to load health records: {}", e))
}

/// First and last day of a `window_days` window ending on `today`
pub(crate) fn window_bounds(today: NaiveDate, window_days: u32) -> (NaiveDate, NaiveDate) {
    let span = i64::from(window_days.max(1)) - 1;
    (add_days(today, -span), today)
}

// ============================================================================
// Dashboard Tools
// ============================================================================

/// Progress of the active goal, judged on yesterday's record.
///
/// `Ok(None)` when no goal is active.
pub fn goal_progress(
    stores: &Stores,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Option<GoalProgressResponse>, String> {
    let Some(goal) = get_active_goal(stores)? else {
        return Ok(None);
    };

    let yesterday = resolve_yesterday_in(now, offset);
    let candidates = match stores
        .records
        .find_by_date(yesterday)
        .map_err(|e| format!("Failed to get health record: {}", e))?
    {
        Some(record) => vec![record],
        None => stores
            .records
            .find_many(&FindManyOptions::latest(1))
            .map_err(|e| format!("Failed to get latest health record: {}", e))?,
    };

    let result = evaluate_progress_at(&goal, &candidates, now, offset)
        .map_err(|e| format!("Cannot evaluate goal: {}", e))?;

    tracing::debug!(
        goal_id = goal.id,
        reference = %result.reference_date,
        percentage = result.progress.progress_percentage,
        "Evaluated goal progress"
    );

    Ok(Some(result.into()))
}

/// Linear target weight over the trailing window, with recorded weights
pub fn weight_trajectory(
    stores: &Stores,
    now: DateTime<Utc>,
    offset: FixedOffset,
    window_days: u32,
) -> Result<Option<WeightTrajectoryResponse>, String> {
    let Some(goal) = get_active_goal(stores)? else {
        return Ok(None);
    };

    let today = resolve_today_in(now, offset);
    let history = load_history(stores)?;
    let trajectory = generate_trajectory(&goal, &history, window_days, today);
    let has_line = goal.target_weight_kg.is_some() && trajectory.len() != 0;

    let (from, to) = window_bounds(today, window_days);
    let actual = history
        .iter()
        .filter(|r| r.date >= from && r.date <= to)
        .filter_map(|r| r.weight.map(|weight| WeightSample { date: r.date, weight }))
        .collect();

    Ok(Some(WeightTrajectoryResponse {
        goal_id: goal.id,
        goal_name: goal.name.clone(),
        today,
        window_days,
        start_weight: has_line.then(|| trajectory.start_weight()),
        direction: has_line.then(|| trajectory.direction()),
        daily_change: has_line.then(|| trajectory.daily_loss()),
        points: trajectory.collect(),
        actual,
    }))
}

/// Most recent record with derived intake figures.
///
/// `Ok(None)` when nothing has been recorded.
pub fn latest_metrics(stores: &Stores) -> Result<Option<LatestMetrics>, String> {
    let recent = stores
        .records
        .find_many(&FindManyOptions::latest(2))
        .map_err(|e| format!("Failed to get latest health records: {}", e))?;

    let mut recent = recent.into_iter();
    let Some(latest) = recent.next() else {
        return Ok(None);
    };
    let previous = recent.next();

    let weight_change = match (latest.weight, previous.as_ref().and_then(|p| p.weight)) {
        (Some(now), Some(before)) => Some(round_to_tenth(now - before)),
        _ => None,
    };

    Ok(Some(LatestMetrics {
        date: latest.date,
        weight: latest.weight,
        weight_change,
        previous_date: previous.map(|p| p.date),
        body_fat_percentage: latest.body_fat_percentage,
        muscle_mass: latest.muscle_mass,
        steps: latest.steps,
        total_calories: latest.total_calories,
        protein_g: latest.protein_g,
        fat_g: latest.fat_g,
        carbohydrate_g: latest.carbohydrate_g,
        intake_calories: compute_intake_calories(latest.protein_g, latest.fat_g, latest.carbohydrate_g),
        macro_ratio: compute_macro_ratio(latest.protein_g, latest.fat_g, latest.carbohydrate_g),
    }))
}

/// Recorded days in the trailing window against the active goal's bands
pub fn goal_comparison(
    stores: &Stores,
    now: DateTime<Utc>,
    offset: FixedOffset,
    window_days: u32,
) -> Result<Option<GoalComparisonResponse>, String> {
    let Some(goal) = get_active_goal(stores)? else {
        return Ok(None);
    };

    let (from, to) = window_bounds(resolve_today_in(now, offset), window_days);
    let history = load_history(stores)?;

    let mut summary = ComparisonSummary::default();
    let days: Vec<ComparisonDay> = history
        .iter()
        .filter(|r| r.date >= from && r.date <= to)
        .map(|record| {
            let achievements = evaluate_daily_achievements(&goal, Some(record));
            summary.days_recorded += 1;
            summary.calories_within += usize::from(achievements.calories == RangeStatus::Within);
            summary.protein_within += usize::from(achievements.protein == RangeStatus::Within);
            summary.fat_within += usize::from(achievements.fat == RangeStatus::Within);
            summary.carbohydrate_within += usize::from(achievements.carbohydrate == RangeStatus::Within);
            summary.steps_achieved += usize::from(achievements.steps == ThresholdStatus::Achieved);

            ComparisonDay {
                date: record.date,
                intake_calories: compute_intake_calories(record.protein_g, record.fat_g, record.carbohydrate_g),
                protein_g: record.protein_g,
                fat_g: record.fat_g,
                carbohydrate_g: record.carbohydrate_g,
                steps: record.steps,
                achievements,
            }
        })
        .collect();

    Ok(Some(GoalComparisonResponse {
        goal_id: goal.id,
        goal_name: goal.name.clone(),
        from,
        to,
        bands: GoalBands::of(&goal),
        days,
        summary,
    }))
}
