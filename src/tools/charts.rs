//! Weight chart rendering
//!
//! Draws recorded weights against the linear target line and renders the
//! chart to PNG with plotters' bitmap backend.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;

use crate::progress::dates::days_between;
use crate::storage::Stores;
use super::dashboard::{weight_trajectory, window_bounds};

pub const DEFAULT_CHART_WIDTH: u32 = 900;
pub const DEFAULT_CHART_HEIGHT: u32 = 500;

const MIN_CHART_SIDE: u32 = 200;
const MAX_CHART_SIDE: u32 = 4000;

/// Series for the weight chart, x = days since the window start
#[derive(Debug, Clone, PartialEq)]
pub struct WeightChartData {
    pub goal_name: String,
    pub from: NaiveDate,
    pub days: i32,
    pub actual: Vec<(i32, f64)>,
    pub linear: Vec<(i32, f64)>,
    pub target: Option<f64>,
}

impl WeightChartData {
    /// Y axis range with 1 kg of headroom
    fn y_range(&self) -> (f64, f64) {
        let values = self
            .actual
            .iter()
            .chain(self.linear.iter())
            .map(|(_, w)| *w)
            .chain(self.target);
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (lo.floor() - 1.0, hi.ceil() + 1.0)
    }
}

/// Response for generate_weight_chart
#[derive(Debug, Serialize)]
pub struct WriteChartResponse {
    pub path: String,
    pub bytes: usize,
    pub width: u32,
    pub height: u32,
    pub weight_samples: usize,
    pub target_points: usize,
}

/// Collect the chart series for the active goal
pub fn weight_chart_data(
    stores: &Stores,
    now: DateTime<Utc>,
    offset: FixedOffset,
    window_days: u32,
) -> Result<WeightChartData, String> {
    let trajectory = weight_trajectory(stores, now, offset, window_days)?
        .ok_or("No active goal to chart")?;

    // Axis starts at the first plotted day, not at the window start
    let (window_from, to) = window_bounds(trajectory.today, window_days);
    let first_plotted = trajectory
        .points
        .first()
        .map(|p| p.date)
        .into_iter()
        .chain(trajectory.actual.first().map(|s| s.date))
        .min();
    let from = first_plotted.map_or(window_from, |d| d.max(window_from));
    let x = |date: NaiveDate| days_between(date, from) as i32;

    let data = WeightChartData {
        goal_name: trajectory.goal_name,
        from,
        days: x(to) + 1,
        actual: trajectory.actual.iter().map(|s| (x(s.date), s.weight)).collect(),
        linear: trajectory.points.iter().map(|p| (x(p.date), p.linear_target)).collect(),
        target: trajectory.points.first().map(|p| p.target_weight),
    };

    if data.actual.is_empty() && data.linear.is_empty() {
        return Err("No data to chart".to_string());
    }
    Ok(data)
}

/// Render chart data as PNG bytes
pub fn render_chart_png(data: &WeightChartData, width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    let width = width.clamp(MIN_CHART_SIDE, MAX_CHART_SIDE);
    let height = height.clamp(MIN_CHART_SIDE, MAX_CHART_SIDE);
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let (y_min, y_max) = data.y_range();
        let from = data.from;

        let mut chart = ChartBuilder::on(&root)
            .caption(&data.goal_name, ("sans-serif", 20))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..data.days, y_min..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels((data.days as usize).min(10))
            .x_label_formatter(&|x| {
                from.checked_add_days(chrono::Days::new(*x as u64))
                    .map(|d| d.format("%m/%d").to_string())
                    .unwrap_or_default()
            })
            .y_desc("kg")
            .draw()
            .map_err(|e| e.to_string())?;

        if let Some(target) = data.target {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0, target), (data.days, target)],
                    ShapeStyle::from(&RGBColor(16, 185, 129)).stroke_width(1),
                )))
                .map_err(|e| e.to_string())?
                .label("Target")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(16, 185, 129).stroke_width(1)));
        }

        if !data.linear.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    data.linear.clone(),
                    RGBColor(239, 68, 68).mix(0.8).stroke_width(2),
                ))
                .map_err(|e| e.to_string())?
                .label("Linear target")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(239, 68, 68).stroke_width(2)));
        }

        if !data.actual.is_empty() {
            chart
                .draw_series(LineSeries::new(data.actual.clone(), BLUE.stroke_width(2)))
                .map_err(|e| e.to_string())?
                .label("Weight")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

            chart
                .draw_series(data.actual.iter().map(|(x, y)| Circle::new((*x, *y), 3, BLUE.filled())))
                .map_err(|e| e.to_string())?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    // Convert RGB buffer to PNG
    let img = RgbImage::from_raw(width, height, buffer).ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Render the active goal's weight chart as PNG bytes
pub fn render_weight_chart(
    stores: &Stores,
    now: DateTime<Utc>,
    offset: FixedOffset,
    window_days: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    let data = weight_chart_data(stores, now, offset, window_days)?;
    render_chart_png(&data, width, height)
}

/// Render the weight chart and write it to `path`
pub fn write_weight_chart(
    stores: &Stores,
    path: &Path,
    now: DateTime<Utc>,
    offset: FixedOffset,
    window_days: u32,
    width: u32,
    height: u32,
) -> Result<WriteChartResponse, String> {
    let data = weight_chart_data(stores, now, offset, window_days)?;
    let png = render_chart_png(&data, width, height)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    std::fs::write(path, &png).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

    tracing::info!(path = %path.display(), bytes = png.len(), "Wrote weight chart");

    Ok(WriteChartResponse {
        path: path.display().to_string(),
        bytes: png.len(),
        width: width.clamp(MIN_CHART_SIDE, MAX_CHART_SIDE),
        height: height.clamp(MIN_CHART_SIDE, MAX_CHART_SIDE),
        weight_samples: data.actual.len(),
        target_points: data.linear.len(),
    })
}

/// `weight_chart_<date>.png` next to the database
pub fn default_chart_path(database_path: &Path, today: NaiveDate) -> PathBuf {
    let dir = database_path.parent().unwrap_or_else(|| Path::new("."));
    dir.join("charts").join(format!("weight_chart_{}.png", today.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalCreate, HealthRecordCreate};
    use crate::progress::dates::default_offset;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_chart_data_indexes_by_window_day() {
        let stores = Stores::memory();
        let mut goal = GoalCreate::new("Cut", date(2025, 7, 26), date(2025, 9, 30));
        goal.target_weight_kg = Some(100.0);
        stores.goals.create_goal(&goal).unwrap();
        stores
            .records
            .upsert(&HealthRecordCreate {
                weight: Some(104.2),
                ..HealthRecordCreate::for_date(date(2025, 7, 30))
            })
            .unwrap();

        // 10:00 JST on Aug 1, 10-day window Jul 23..Aug 1, plotted from the Jul 26 start
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 1, 0, 0).unwrap();
        let data = weight_chart_data(&stores, now, default_offset(), 10).unwrap();
        assert_eq!(data.from, date(2025, 7, 26));
        assert_eq!(data.days, 7);
        assert_eq!(data.actual, vec![(4, 104.2)]);
        assert_eq!(data.linear.len(), 7);
        assert_eq!(data.linear[0].0, 0);
        assert_eq!(data.target, Some(100.0));

        let (lo, hi) = data.y_range();
        assert_eq!(lo, 99.0);
        assert_eq!(hi, 106.0);
    }

    #[test]
    fn test_chart_axis_starts_at_first_plotted_day() {
        let stores = Stores::memory();
        let mut goal = GoalCreate::new("Cut", date(2025, 7, 26), date(2025, 9, 30));
        goal.target_weight_kg = Some(100.0);
        stores.goals.create_goal(&goal).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 8, 1, 1, 0, 0).unwrap();
        let data = weight_chart_data(&stores, now, default_offset(), u32::MAX).unwrap();
        assert_eq!(data.from, date(2025, 7, 26));
        assert_eq!(data.days, 7);
        assert_eq!(data.linear.first().map(|p| p.0), Some(0));
    }

    #[test]
    fn test_chart_requires_goal() {
        let stores = Stores::memory();
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 1, 0, 0).unwrap();
        assert!(weight_chart_data(&stores, now, default_offset(), 30).is_err());
    }

    #[test]
    fn test_default_chart_path() {
        let path = default_chart_path(Path::new("/srv/hd/data/healthdash.db"), date(2025, 8, 1));
        assert_eq!(path, PathBuf::from("/srv/hd/data/charts/weight_chart_2025-08-01.png"));
    }
}
