//! Macronutrient energy calculations
//!
//! Converts protein / fat / carbohydrate grams into intake kilocalories and
//! into each macro's share of that energy.

use serde::{Deserialize, Serialize};

/// Energy per gram of protein
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
/// Energy per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;
/// Energy per gram of carbohydrate
pub const KCAL_PER_G_CARBOHYDRATE: f64 = 4.0;

/// Percentage share of intake calories per macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
}

/// Round to one decimal place (half away from zero)
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn macro_calories(protein_g: Option<f64>, fat_g: Option<f64>, carbohydrate_g: Option<f64>) -> (f64, f64, f64) {
    (
        protein_g.unwrap_or(0.0) * KCAL_PER_G_PROTEIN,
        fat_g.unwrap_or(0.0) * KCAL_PER_G_FAT,
        carbohydrate_g.unwrap_or(0.0) * KCAL_PER_G_CARBOHYDRATE,
    )
}

/// Intake kilocalories from macronutrient grams.
///
/// Returns `None` only when all three inputs are missing. A partially filled
/// day counts the missing macros as zero.
pub fn compute_intake_calories(
    protein_g: Option<f64>,
    fat_g: Option<f64>,
    carbohydrate_g: Option<f64>,
) -> Option<f64> {
    if protein_g.is_none() && fat_g.is_none() && carbohydrate_g.is_none() {
        return None;
    }

    let (protein, fat, carbohydrate) = macro_calories(protein_g, fat_g, carbohydrate_g);
    Some(round_to_tenth(protein + fat + carbohydrate))
}

/// Share of intake calories contributed by each macro, in percent.
///
/// Each share is rounded independently, so the three values need not add
/// up to exactly 100. Returns `None` when there is no energy to divide.
pub fn compute_macro_ratio(
    protein_g: Option<f64>,
    fat_g: Option<f64>,
    carbohydrate_g: Option<f64>,
) -> Option<MacroRatio> {
    let total = compute_intake_calories(protein_g, fat_g, carbohydrate_g)?;
    if total == 0.0 {
        return None;
    }

    let (protein, fat, carbohydrate) = macro_calories(protein_g, fat_g, carbohydrate_g);
    Some(MacroRatio {
        protein: round_to_tenth(protein / total * 100.0),
        fat: round_to_tenth(fat / total * 100.0),
        carbohydrate: round_to_tenth(carbohydrate / total * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_calories_all_missing() {
        assert_eq!(compute_intake_calories(None, None, None), None);
    }

    #[test]
    fn test_intake_calories_all_zero() {
        assert_eq!(compute_intake_calories(Some(0.0), Some(0.0), Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_intake_calories_full_day() {
        // 100*4 + 50*9 + 200*4
        assert_eq!(compute_intake_calories(Some(100.0), Some(50.0), Some(200.0)), Some(1650.0));
    }

    #[test]
    fn test_intake_calories_partial_inputs_count_as_zero() {
        assert_eq!(compute_intake_calories(Some(25.0), None, None), Some(100.0));
        assert_eq!(compute_intake_calories(None, Some(10.0), None), Some(90.0));
    }

    #[test]
    fn test_intake_calories_rounds_to_one_decimal() {
        // 12.34 * 4 = 49.36
        assert_eq!(compute_intake_calories(Some(12.34), None, None), Some(49.4));
    }

    #[test]
    fn test_macro_ratio() {
        let ratio = compute_macro_ratio(Some(100.0), Some(50.0), Some(200.0)).unwrap();
        assert_eq!(ratio.protein, 24.2);
        assert_eq!(ratio.fat, 27.3);
        assert_eq!(ratio.carbohydrate, 48.5);
        for share in [ratio.protein, ratio.fat, ratio.carbohydrate] {
            assert!((0.0..=100.0).contains(&share));
        }
    }

    #[test]
    fn test_macro_ratio_undefined_without_energy() {
        assert_eq!(compute_macro_ratio(None, None, None), None);
        assert_eq!(compute_macro_ratio(Some(0.0), Some(0.0), None), None);
    }

    #[test]
    fn test_macro_ratio_single_macro() {
        let ratio = compute_macro_ratio(None, Some(20.0), None).unwrap();
        assert_eq!(ratio.fat, 100.0);
        assert_eq!(ratio.protein, 0.0);
        assert_eq!(ratio.carbohydrate, 0.0);
    }
}
