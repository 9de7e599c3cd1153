//! Linear weight trajectory
//!
//! A straight-line target weight from the goal's start weight down (or up) to
//! its target weight, sampled day by day over a trailing display window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Goal, HealthRecord};
use super::dates::{add_days, days_between};

/// Assumed excess over target when no weight has been recorded yet
pub const FALLBACK_START_OFFSET_KG: f64 = 15.0;

/// One day of the target curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTrajectoryPoint {
    pub date: NaiveDate,
    pub target_weight: f64,
    pub linear_target: f64,
}

/// Which way the goal moves the weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryDirection {
    Loss,
    Gain,
}

impl TrajectoryDirection {
    fn from_weights(start_weight: f64, target: f64) -> Self {
        if start_weight >= target {
            TrajectoryDirection::Loss
        } else {
            TrajectoryDirection::Gain
        }
    }

    /// Keep `linear` from overshooting `target`
    fn clamp(self, linear: f64, target: f64) -> f64 {
        match self {
            TrajectoryDirection::Loss => linear.max(target),
            TrajectoryDirection::Gain => linear.min(target),
        }
    }
}

/// Lazily generated trajectory points.
///
/// Holds only the line parameters and the next date to emit; clone it to
/// walk the same window again.
#[derive(Debug, Clone)]
pub struct WeightTrajectory {
    start_date: NaiveDate,
    start_weight: f64,
    target: f64,
    daily_loss: f64,
    direction: TrajectoryDirection,
    next: NaiveDate,
    last: NaiveDate,
}

impl WeightTrajectory {
    fn empty() -> Self {
        // next > last, so nothing is ever yielded
        Self {
            start_date: NaiveDate::MIN,
            start_weight: 0.0,
            target: 0.0,
            daily_loss: 0.0,
            direction: TrajectoryDirection::Loss,
            next: NaiveDate::MAX,
            last: NaiveDate::MIN,
        }
    }

    pub fn start_weight(&self) -> f64 {
        self.start_weight
    }

    pub fn daily_loss(&self) -> f64 {
        self.daily_loss
    }

    pub fn direction(&self) -> TrajectoryDirection {
        self.direction
    }

    fn remaining(&self) -> usize {
        if self.next > self.last {
            0
        } else {
            (days_between(self.last, self.next) + 1) as usize
        }
    }
}

impl Iterator for WeightTrajectory {
    type Item = WeightTrajectoryPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let date = self.next;
        match date.succ_opt() {
            Some(next) => self.next = next,
            None => self.last = NaiveDate::MIN,
        }

        let days_since_start = days_between(date, self.start_date) as f64;
        let linear = self.start_weight - self.daily_loss * days_since_start;

        Some(WeightTrajectoryPoint {
            date,
            target_weight: self.target,
            linear_target: self.direction.clamp(linear, self.target),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for WeightTrajectory {}

/// Starting weight for the line.
///
/// The earliest weighed day anchors it. When that day is after the goal
/// started and a second weighed day exists, the trend between the first two
/// is extended back to `start_date`.
pub fn estimate_start_weight(records: &[HealthRecord], start_date: NaiveDate, target: f64) -> f64 {
    let mut weighted: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter_map(|r| r.weight.map(|w| (r.date, w)))
        .collect();
    weighted.sort_by_key(|(date, _)| *date);

    match weighted.as_slice() {
        [] => target + FALLBACK_START_OFFSET_KG,
        [(first_date, first_weight), (second_date, second_weight), ..] if *first_date > start_date => {
            let span = days_between(*second_date, *first_date);
            if span <= 0 {
                return *first_weight;
            }
            let rate = (second_weight - first_weight) / span as f64;
            first_weight - rate * days_between(*first_date, start_date) as f64
        }
        [(_, first_weight), ..] => *first_weight,
    }
}

/// Build the target curve for the `window_days` days ending on `today`,
/// limited to the goal period.
///
/// Yields nothing when the goal has no target weight or no period.
pub fn generate_trajectory(
    goal: &Goal,
    records: &[HealthRecord],
    window_days: u32,
    today: NaiveDate,
) -> WeightTrajectory {
    let (Some(target), Some(start), Some(end)) = (goal.target_weight_kg, goal.start_date, goal.end_date) else {
        return WeightTrajectory::empty();
    };
    if window_days == 0 {
        return WeightTrajectory::empty();
    }

    let start_weight = estimate_start_weight(records, start, target);
    let period = days_between(end, start).max(1);
    let daily_loss = (start_weight - target) / period as f64;

    let window_start = add_days(today, -(i64::from(window_days) - 1));
    let first = window_start.max(start);
    let last = today.min(end);

    WeightTrajectory {
        start_date: start,
        start_weight,
        target,
        daily_loss,
        direction: TrajectoryDirection::from_weights(start_weight, target),
        next: first,
        last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalCreate, HealthRecordCreate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(target: f64, start: NaiveDate, end: NaiveDate) -> Goal {
        let mut data = GoalCreate::new("Plan", start, end);
        data.target_weight_kg = Some(target);
        Goal::from_create(1, &data, String::new(), String::new())
    }

    fn weighed(day: NaiveDate, weight: f64) -> HealthRecord {
        HealthRecord::from_create(
            0,
            &HealthRecordCreate {
                weight: Some(weight),
                ..HealthRecordCreate::for_date(day)
            },
            String::new(),
            String::new(),
        )
    }

    #[test]
    fn test_fallback_start_is_monotonic() {
        let g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        let points: Vec<_> = generate_trajectory(&g, &[], 30, date(2025, 8, 20)).collect();

        // Jul 22..Aug 20 clipped to the Jul 26 start
        assert_eq!(points.len(), 26);
        assert_eq!(points[0].date, date(2025, 7, 26));
        assert!(points.windows(2).all(|w| w[1].linear_target < w[0].linear_target));
        assert!(points.iter().all(|p| p.target_weight == 100.0 && p.linear_target >= 100.0));
    }

    #[test]
    fn test_fallback_start_weight() {
        let g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        let mut trajectory = generate_trajectory(&g, &[], 30, date(2025, 7, 26));
        assert_eq!(trajectory.start_weight(), 115.0);
        let first = trajectory.next().unwrap();
        assert_eq!(first.date, date(2025, 7, 26));
        assert_eq!(first.linear_target, 115.0);
        assert!(trajectory.next().is_none());
    }

    #[test]
    fn test_earliest_sample_anchors_line() {
        let g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        let records = vec![weighed(date(2025, 7, 30), 104.0), weighed(date(2025, 7, 24), 106.0)];
        assert_eq!(estimate_start_weight(&records, date(2025, 7, 26), 100.0), 106.0);

        let trajectory = generate_trajectory(&g, &records, 10, date(2025, 8, 1));
        assert_eq!(trajectory.direction(), TrajectoryDirection::Loss);
        assert!((trajectory.daily_loss() - 6.0 / 66.0).abs() < 1e-12);
    }

    #[test]
    fn test_back_projection() {
        // 0.5 kg/day loss observed between Jul 30 and Aug 1, extended back 4 days
        let records = vec![weighed(date(2025, 8, 1), 104.0), weighed(date(2025, 7, 30), 105.0)];
        let start = estimate_start_weight(&records, date(2025, 7, 26), 100.0);
        assert!((start - 107.0).abs() < 1e-12);

        // A single late sample is used as-is
        let single = vec![weighed(date(2025, 8, 1), 104.0)];
        assert_eq!(estimate_start_weight(&single, date(2025, 7, 26), 100.0), 104.0);

        // Unweighed days are ignored
        let mut sparse = records.clone();
        sparse.push(HealthRecord::from_create(
            0,
            &HealthRecordCreate::for_date(date(2025, 7, 27)),
            String::new(),
            String::new(),
        ));
        assert!((estimate_start_weight(&sparse, date(2025, 7, 26), 100.0) - 107.0).abs() < 1e-12);
    }

    #[test]
    fn test_gain_goal_rises_and_clamps() {
        let g = goal(70.0, date(2025, 1, 1), date(2025, 1, 11));
        let records = vec![weighed(date(2025, 1, 1), 65.0)];
        let points: Vec<_> = generate_trajectory(&g, &records, 30, date(2025, 1, 20)).collect();

        assert_eq!(points.len(), 11);
        assert!(points.windows(2).all(|w| w[1].linear_target > w[0].linear_target));
        assert_eq!(points[0].linear_target, 65.0);
        assert!((points[10].linear_target - 70.0).abs() < 1e-9);
        assert!(points.iter().all(|p| p.linear_target <= 70.0));
    }

    #[test]
    fn test_window_intersects_period() {
        let g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));

        // Before the goal starts
        assert_eq!(generate_trajectory(&g, &[], 30, date(2025, 7, 1)).count(), 0);

        // Window tail clipped at the start date
        let early: Vec<_> = generate_trajectory(&g, &[], 30, date(2025, 7, 30)).collect();
        assert_eq!(early.len(), 5);
        assert_eq!(early[0].date, date(2025, 7, 26));

        // Window head clipped at the end date
        let late: Vec<_> = generate_trajectory(&g, &[], 7, date(2025, 10, 3)).collect();
        assert_eq!(late.len(), 4);
        assert_eq!(late.last().unwrap().date, date(2025, 9, 30));
        assert!((late.last().unwrap().linear_target - 100.0).abs() < 1e-9);

        assert_eq!(generate_trajectory(&g, &[], 0, date(2025, 8, 1)).count(), 0);
    }

    #[test]
    fn test_huge_window_covers_whole_period() {
        let g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        let today = date(2025, 8, 20);
        let wide: Vec<_> = generate_trajectory(&g, &[], 400, today).collect();
        let huge: Vec<_> = generate_trajectory(&g, &[], 200_000_000, today).collect();
        let widest = generate_trajectory(&g, &[], u32::MAX, today);

        assert_eq!(wide.len(), 26);
        assert_eq!(huge, wide);
        assert_eq!(widest.len(), 26);
    }

    #[test]
    fn test_incomplete_goal_is_empty() {
        let mut g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        g.target_weight_kg = None;
        assert_eq!(generate_trajectory(&g, &[], 30, date(2025, 8, 1)).count(), 0);

        let mut g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        g.end_date = None;
        assert_eq!(generate_trajectory(&g, &[], 30, date(2025, 8, 1)).count(), 0);
    }

    #[test]
    fn test_single_day_period() {
        let g = goal(100.0, date(2025, 8, 1), date(2025, 8, 1));
        let points: Vec<_> = generate_trajectory(&g, &[weighed(date(2025, 8, 1), 101.0)], 30, date(2025, 8, 1)).collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].linear_target, 101.0);
    }

    #[test]
    fn test_restartable_and_idempotent() {
        let g = goal(100.0, date(2025, 7, 26), date(2025, 9, 30));
        let records = vec![weighed(date(2025, 7, 28), 104.0), weighed(date(2025, 8, 2), 103.1)];
        let trajectory = generate_trajectory(&g, &records, 14, date(2025, 8, 10));
        assert_eq!(trajectory.len(), 14);

        let first: Vec<_> = trajectory.clone().collect();
        let second: Vec<_> = trajectory.collect();
        let fresh: Vec<_> = generate_trajectory(&g, &records, 14, date(2025, 8, 10)).collect();
        assert_eq!(first, second);
        assert_eq!(first, fresh);
        assert!(first
            .iter()
            .zip(&fresh)
            .all(|(a, b)| a.linear_target.to_bits() == b.linear_target.to_bits()));
    }
}
