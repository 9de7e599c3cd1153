//! Goal progress engine
//!
//! Pure, synchronous computations over a goal and its health records: date
//! resolution in a fixed offset, band classification, progress snapshots and
//! the linear weight trajectory. Nothing here touches storage.

pub mod classify;
pub mod dates;
pub mod evaluator;
pub mod trajectory;

pub use classify::{classify_range, classify_threshold, RangeStatus, ThresholdStatus};
pub use dates::{resolve_today, resolve_today_in, resolve_yesterday, resolve_yesterday_in};
pub use evaluator::{
    evaluate_daily_achievements, evaluate_progress, evaluate_progress_at, select_active_goal,
    select_reference_record, DailyAchievements, DashboardProgress, GoalProgress, ProgressError,
};
pub use trajectory::{
    generate_trajectory, TrajectoryDirection, WeightTrajectory, WeightTrajectoryPoint,
};
