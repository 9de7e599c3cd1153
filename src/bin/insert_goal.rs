//! Utility to seed the sample weight-loss goal into the database

use chrono::NaiveDate;
use healthdash::config::AppConfig;
use healthdash::models::GoalCreate;
use healthdash::storage::Stores;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    println!("Database path: {}", config.database_path.display());

    let stores = Stores::from_config(&config)?;

    let start = NaiveDate::from_ymd_opt(2025, 7, 26).ok_or("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2025, 9, 30).ok_or("invalid end date")?;

    let goal = GoalCreate {
        description: Some("Reach 100 kg by the end of September".to_string()),
        target_weight_kg: Some(100.0),
        daily_calorie_intake_min: Some(1600.0),
        daily_calorie_intake_max: Some(2000.0),
        daily_protein_min_g: Some(90.5),
        daily_protein_max_g: Some(158.3),
        daily_fat_min_g: Some(40.2),
        daily_fat_max_g: Some(60.3),
        daily_carb_min_g: Some(203.5),
        daily_carb_max_g: Some(271.4),
        daily_steps_target: Some(8000),
        ..GoalCreate::new("Summer cut", start, end)
    };

    let goal = stores.goals.create_goal(&goal)?;
    println!("Goal created:");
    println!("  ID: {}", goal.id);
    println!("  Name: {}", goal.name);
    println!("  Period: {:?} to {:?}", goal.start_date, goal.end_date);
    println!("  Target weight: {:?} kg", goal.target_weight_kg);
    println!("  Active: {}", goal.is_active);

    Ok(())
}
