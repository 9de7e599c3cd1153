//! Data models
//!
//! Rust structs representing database entities.

mod goal;
mod health_record;
mod validation;

pub use goal::{Goal, GoalCreate, GoalUpdate};
pub use health_record::{
    derive_total_calories, HealthRecord, HealthRecordCreate, HealthRecordInput,
    HealthRecordUpdate, SortOrder,
};
pub use validation::ValidationError;
