//! Metric classification against goal bounds

use serde::{Deserialize, Serialize};

/// Where a value falls relative to an optional `[min, max]` band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Under,
    Within,
    Over,
    NoData,
}

impl RangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeStatus::Under => "under",
            RangeStatus::Within => "within",
            RangeStatus::Over => "over",
            RangeStatus::NoData => "no_data",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RangeStatus::Under => "Below target",
            RangeStatus::Within => "Within target",
            RangeStatus::Over => "Above target",
            RangeStatus::NoData => "No data",
        }
    }
}

/// Whether a value reached a single achievement threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    Achieved,
    NotAchieved,
    NoData,
}

impl ThresholdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdStatus::Achieved => "achieved",
            ThresholdStatus::NotAchieved => "not_achieved",
            ThresholdStatus::NoData => "no_data",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThresholdStatus::Achieved => "Achieved",
            ThresholdStatus::NotAchieved => "Not achieved",
            ThresholdStatus::NoData => "No data",
        }
    }
}

/// Classify `value` against an inclusive band where either bound may be open.
///
/// A missing value, or a band with neither bound set, is `NoData`.
pub fn classify_range(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> RangeStatus {
    let Some(value) = value else {
        return RangeStatus::NoData;
    };
    if min.is_none() && max.is_none() {
        return RangeStatus::NoData;
    }

    match (min, max) {
        (Some(min), _) if value < min => RangeStatus::Under,
        (_, Some(max)) if value > max => RangeStatus::Over,
        _ => RangeStatus::Within,
    }
}

/// Classify `value` against a minimum target (reached when `value >= target`)
pub fn classify_threshold(value: Option<f64>, target: Option<f64>) -> ThresholdStatus {
    match (value, target) {
        (Some(value), Some(target)) if value >= target => ThresholdStatus::Achieved,
        (Some(_), Some(_)) => ThresholdStatus::NotAchieved,
        _ => ThresholdStatus::NoData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_range_band() {
        assert_eq!(classify_range(Some(50.0), Some(60.0), Some(100.0)), RangeStatus::Under);
        assert_eq!(classify_range(Some(110.0), Some(60.0), Some(100.0)), RangeStatus::Over);
        assert_eq!(classify_range(Some(80.0), Some(60.0), Some(100.0)), RangeStatus::Within);
    }

    #[test]
    fn test_classify_range_inclusive_bounds() {
        assert_eq!(classify_range(Some(60.0), Some(60.0), Some(100.0)), RangeStatus::Within);
        assert_eq!(classify_range(Some(100.0), Some(60.0), Some(100.0)), RangeStatus::Within);
    }

    #[test]
    fn test_classify_range_no_data() {
        assert_eq!(classify_range(None, Some(60.0), Some(100.0)), RangeStatus::NoData);
        assert_eq!(classify_range(Some(80.0), None, None), RangeStatus::NoData);
    }

    #[test]
    fn test_classify_range_open_bounds() {
        assert_eq!(classify_range(Some(10.0), Some(60.0), None), RangeStatus::Under);
        assert_eq!(classify_range(Some(1000.0), Some(60.0), None), RangeStatus::Within);
        assert_eq!(classify_range(Some(1000.0), None, Some(100.0)), RangeStatus::Over);
        assert_eq!(classify_range(Some(0.0), None, Some(100.0)), RangeStatus::Within);
    }

    #[test]
    fn test_classify_threshold() {
        assert_eq!(classify_threshold(Some(8000.0), Some(8000.0)), ThresholdStatus::Achieved);
        assert_eq!(classify_threshold(Some(7999.0), Some(8000.0)), ThresholdStatus::NotAchieved);
        assert_eq!(classify_threshold(None, Some(8000.0)), ThresholdStatus::NoData);
        assert_eq!(classify_threshold(Some(8000.0), None), ThresholdStatus::NoData);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&RangeStatus::NoData).unwrap(), "\"no_data\"");
        assert_eq!(serde_json::to_string(&ThresholdStatus::NotAchieved).unwrap(), "\"not_achieved\"");
        assert_eq!(RangeStatus::Within.as_str(), "within");
    }
}
