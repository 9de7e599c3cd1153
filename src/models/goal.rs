//! Goal model
//!
//! A weight/nutrition plan: target weight, plan period, daily intake bands
//! and a step target. Only active goals take part in progress evaluation.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::validation::{check_band, check_positive, ValidationError};

/// A stored goal.
///
/// Dates are optional here because goals can also arrive from outside the
/// store; the progress evaluator rejects a goal without its period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "target_weight_kg")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, alias = "start_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, alias = "daily_calorie_intake_min")]
    pub daily_calorie_intake_min: Option<f64>,
    #[serde(default, alias = "daily_calorie_intake_max")]
    pub daily_calorie_intake_max: Option<f64>,
    #[serde(default, alias = "daily_protein_min_g")]
    pub daily_protein_min_g: Option<f64>,
    #[serde(default, alias = "daily_protein_max_g")]
    pub daily_protein_max_g: Option<f64>,
    #[serde(default, alias = "daily_fat_min_g")]
    pub daily_fat_min_g: Option<f64>,
    #[serde(default, alias = "daily_fat_max_g")]
    pub daily_fat_max_g: Option<f64>,
    #[serde(default, alias = "daily_carb_min_g")]
    pub daily_carb_min_g: Option<f64>,
    #[serde(default, alias = "daily_carb_max_g")]
    pub daily_carb_max_g: Option<f64>,
    #[serde(default, alias = "daily_steps_target")]
    pub daily_steps_target: Option<i64>,
    #[serde(default, alias = "is_active")]
    pub is_active: bool,
    #[serde(default, alias = "created_at")]
    pub created_at: String,
    #[serde(default, alias = "updated_at")]
    pub updated_at: String,
}

/// Data for creating a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCreate {
    pub name: String,
    pub description: Option<String>,
    pub target_weight_kg: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_calorie_intake_min: Option<f64>,
    pub daily_calorie_intake_max: Option<f64>,
    pub daily_protein_min_g: Option<f64>,
    pub daily_protein_max_g: Option<f64>,
    pub daily_fat_min_g: Option<f64>,
    pub daily_fat_max_g: Option<f64>,
    pub daily_carb_min_g: Option<f64>,
    pub daily_carb_max_g: Option<f64>,
    pub daily_steps_target: Option<i64>,
    pub is_active: bool,
}

/// Data for updating a goal (only `Some` fields change)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_weight_kg: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub daily_calorie_intake_min: Option<f64>,
    pub daily_calorie_intake_max: Option<f64>,
    pub daily_protein_min_g: Option<f64>,
    pub daily_protein_max_g: Option<f64>,
    pub daily_fat_min_g: Option<f64>,
    pub daily_fat_max_g: Option<f64>,
    pub daily_carb_min_g: Option<f64>,
    pub daily_carb_max_g: Option<f64>,
    pub daily_steps_target: Option<i64>,
    pub is_active: Option<bool>,
}

impl GoalCreate {
    /// A goal with only its name and period set
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: None,
            target_weight_kg: None,
            start_date,
            end_date,
            daily_calorie_intake_min: None,
            daily_calorie_intake_max: None,
            daily_protein_min_g: None,
            daily_protein_max_g: None,
            daily_fat_min_g: None,
            daily_fat_max_g: None,
            daily_carb_min_g: None,
            daily_carb_max_g: None,
            daily_steps_target: None,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Missing("name"));
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::field(
                "endDate",
                format!("{} is before start date {}", self.end_date, self.start_date),
            ));
        }
        check_positive("targetWeightKg", self.target_weight_kg)?;
        check_band("dailyCalorieIntake", self.daily_calorie_intake_min, self.daily_calorie_intake_max)?;
        check_band("dailyProtein", self.daily_protein_min_g, self.daily_protein_max_g)?;
        check_band("dailyFat", self.daily_fat_min_g, self.daily_fat_max_g)?;
        check_band("dailyCarb", self.daily_carb_min_g, self.daily_carb_max_g)?;
        if matches!(self.daily_steps_target, Some(s) if s < 0) {
            return Err(ValidationError::field("dailyStepsTarget", "must not be negative"));
        }
        Ok(())
    }
}

impl GoalUpdate {
    /// The full goal definition after applying this update to `goal`
    pub fn apply_to(&self, goal: &Goal) -> Result<GoalCreate, ValidationError> {
        let start_date = self
            .start_date
            .or(goal.start_date)
            .ok_or(ValidationError::Missing("startDate"))?;
        let end_date = self
            .end_date
            .or(goal.end_date)
            .ok_or(ValidationError::Missing("endDate"))?;

        let merged = GoalCreate {
            name: self.name.clone().unwrap_or_else(|| goal.name.clone()),
            description: self.description.clone().or_else(|| goal.description.clone()),
            target_weight_kg: self.target_weight_kg.or(goal.target_weight_kg),
            start_date,
            end_date,
            daily_calorie_intake_min: self.daily_calorie_intake_min.or(goal.daily_calorie_intake_min),
            daily_calorie_intake_max: self.daily_calorie_intake_max.or(goal.daily_calorie_intake_max),
            daily_protein_min_g: self.daily_protein_min_g.or(goal.daily_protein_min_g),
            daily_protein_max_g: self.daily_protein_max_g.or(goal.daily_protein_max_g),
            daily_fat_min_g: self.daily_fat_min_g.or(goal.daily_fat_min_g),
            daily_fat_max_g: self.daily_fat_max_g.or(goal.daily_fat_max_g),
            daily_carb_min_g: self.daily_carb_min_g.or(goal.daily_carb_min_g),
            daily_carb_max_g: self.daily_carb_max_g.or(goal.daily_carb_max_g),
            daily_steps_target: self.daily_steps_target.or(goal.daily_steps_target),
            is_active: self.is_active.unwrap_or(goal.is_active),
        };
        merged.validate()?;
        Ok(merged)
    }
}

impl Goal {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            target_weight_kg: row.get("target_weight_kg")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            daily_calorie_intake_min: row.get("daily_calorie_intake_min")?,
            daily_calorie_intake_max: row.get("daily_calorie_intake_max")?,
            daily_protein_min_g: row.get("daily_protein_min_g")?,
            daily_protein_max_g: row.get("daily_protein_max_g")?,
            daily_fat_min_g: row.get("daily_fat_min_g")?,
            daily_fat_max_g: row.get("daily_fat_max_g")?,
            daily_carb_min_g: row.get("daily_carb_min_g")?,
            daily_carb_max_g: row.get("daily_carb_max_g")?,
            daily_steps_target: row.get("daily_steps_target")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Build a goal from validated values (used by the memory store)
    pub fn from_create(id: i64, data: &GoalCreate, created_at: String, updated_at: String) -> Self {
        Self {
            id,
            name: data.name.clone(),
            description: data.description.clone(),
            target_weight_kg: data.target_weight_kg,
            start_date: Some(data.start_date),
            end_date: Some(data.end_date),
            daily_calorie_intake_min: data.daily_calorie_intake_min,
            daily_calorie_intake_max: data.daily_calorie_intake_max,
            daily_protein_min_g: data.daily_protein_min_g,
            daily_protein_max_g: data.daily_protein_max_g,
            daily_fat_min_g: data.daily_fat_min_g,
            daily_fat_max_g: data.daily_fat_max_g,
            daily_carb_min_g: data.daily_carb_min_g,
            daily_carb_max_g: data.daily_carb_max_g,
            daily_steps_target: data.daily_steps_target,
            is_active: data.is_active,
            created_at,
            updated_at,
        }
    }

    /// Create a new goal
    pub fn create(conn: &Connection, data: &GoalCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO goals (
                name, description, target_weight_kg, start_date, end_date,
                daily_calorie_intake_min, daily_calorie_intake_max,
                daily_protein_min_g, daily_protein_max_g,
                daily_fat_min_g, daily_fat_max_g,
                daily_carb_min_g, daily_carb_max_g,
                daily_steps_target, is_active
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                data.name,
                data.description,
                data.target_weight_kg,
                data.start_date,
                data.end_date,
                data.daily_calorie_intake_min,
                data.daily_calorie_intake_max,
                data.daily_protein_min_g,
                data.daily_protein_max_g,
                data.daily_fat_min_g,
                data.daily_fat_max_g,
                data.daily_carb_min_g,
                data.daily_carb_max_g,
                data.daily_steps_target,
                data.is_active as i64,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a goal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM goals WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(goal) => Ok(Some(goal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List goals, newest first
    pub fn list(conn: &Connection, active_only: bool) -> DbResult<Vec<Self>> {
        let sql = if active_only {
            "SELECT * FROM goals WHERE is_active = 1 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT * FROM goals ORDER BY created_at DESC, id DESC"
        };

        let mut stmt = conn.prepare(sql)?;
        let goals = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    /// Overwrite a goal with a full definition
    pub fn update(conn: &Connection, id: i64, data: &GoalCreate) -> DbResult<Option<Self>> {
        conn.execute(
            r#"
            UPDATE goals SET
                name = ?1,
                description = ?2,
                target_weight_kg = ?3,
                start_date = ?4,
                end_date = ?5,
                daily_calorie_intake_min = ?6,
                daily_calorie_intake_max = ?7,
                daily_protein_min_g = ?8,
                daily_protein_max_g = ?9,
                daily_fat_min_g = ?10,
                daily_fat_max_g = ?11,
                daily_carb_min_g = ?12,
                daily_carb_max_g = ?13,
                daily_steps_target = ?14,
                is_active = ?15,
                updated_at = datetime('now')
            WHERE id = ?16
            "#,
            params![
                data.name,
                data.description,
                data.target_weight_kg,
                data.start_date,
                data.end_date,
                data.daily_calorie_intake_min,
                data.daily_calorie_intake_max,
                data.daily_protein_min_g,
                data.daily_protein_max_g,
                data.daily_fat_min_g,
                data.daily_fat_max_g,
                data.daily_carb_min_g,
                data.daily_carb_max_g,
                data.daily_steps_target,
                data.is_active as i64,
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Delete a goal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_validate_period_and_bands() {
        let mut goal = GoalCreate::new("Cut", date(2025, 7, 26), date(2025, 9, 30));
        assert!(goal.validate().is_ok());

        goal.daily_fat_min_g = Some(70.0);
        goal.daily_fat_max_g = Some(60.0);
        assert!(goal.validate().is_err());

        let reversed = GoalCreate::new("Cut", date(2025, 9, 30), date(2025, 7, 26));
        assert!(reversed.validate().is_err());

        let unnamed = GoalCreate::new("  ", date(2025, 7, 26), date(2025, 9, 30));
        assert_eq!(unnamed.validate(), Err(ValidationError::Missing("name")));
    }

    #[test]
    fn test_deserialize_either_casing() {
        let snake = json!({
            "name": "Main diet",
            "target_weight_kg": 100.0,
            "start_date": "2025-07-26",
            "end_date": "2025-09-30",
            "daily_steps_target": 8000,
            "is_active": true
        });
        let camel = json!({
            "name": "Main diet",
            "targetWeightKg": 100.0,
            "startDate": "2025-07-26",
            "endDate": "2025-09-30",
            "dailyStepsTarget": 8000,
            "isActive": true
        });
        let a: Goal = serde_json::from_value(snake).unwrap();
        let b: Goal = serde_json::from_value(camel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.start_date, Some(date(2025, 7, 26)));
        assert_eq!(a.daily_steps_target, Some(8000));
    }

    #[test]
    fn test_create_list_update_delete() {
        let conn = test_conn();
        let mut data = GoalCreate::new("Cut", date(2025, 7, 26), date(2025, 9, 30));
        data.target_weight_kg = Some(100.0);
        let first = Goal::create(&conn, &data).unwrap();
        assert!(first.is_active);
        assert_eq!(first.end_date, Some(date(2025, 9, 30)));

        data.name = "Paused".to_string();
        data.is_active = false;
        let second = Goal::create(&conn, &data).unwrap();

        let active = Goal::list(&conn, true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, first.id);

        let all = Goal::list(&conn, false).unwrap();
        assert_eq!(all[0].id, second.id);

        let update = GoalUpdate {
            daily_steps_target: Some(10000),
            ..Default::default()
        };
        let merged = update.apply_to(&first).unwrap();
        let updated = Goal::update(&conn, first.id, &merged).unwrap().unwrap();
        assert_eq!(updated.daily_steps_target, Some(10000));
        assert_eq!(updated.target_weight_kg, Some(100.0));

        assert!(Goal::delete(&conn, second.id).unwrap());
        assert!(Goal::get_by_id(&conn, second.id).unwrap().is_none());
    }

    #[test]
    fn test_update_rejects_inverted_period() {
        let goal = Goal::from_create(
            1,
            &GoalCreate::new("Cut", date(2025, 7, 26), date(2025, 9, 30)),
            String::new(),
            String::new(),
        );
        let update = GoalUpdate {
            end_date: Some(date(2025, 7, 1)),
            ..Default::default()
        };
        assert!(update.apply_to(&goal).is_err());
    }
}
