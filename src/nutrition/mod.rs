//! Nutrition calculation module
//!
//! Macronutrient energy and ratio calculations.

pub mod macros;

pub use macros::{
    compute_intake_calories, compute_macro_ratio, round_to_tenth, MacroRatio,
    KCAL_PER_G_CARBOHYDRATE, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN,
};
