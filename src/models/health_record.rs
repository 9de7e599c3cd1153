//! Health record model
//!
//! One calendar day of body, activity and nutrition measurements. The date is
//! the upsert key: at most one record exists per day.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::progress::dates::normalize_date_string;
use super::validation::{check_count, check_count_i64, check_non_negative, check_positive, ValidationError};

/// Listing order by date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "oldest" => Ok(SortOrder::Asc),
            "desc" | "descending" | "newest" | "" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::field("order", "must be 'asc' or 'desc'")),
        }
    }
}

/// A stored day of measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    #[serde(default)]
    pub id: i64,
    pub date: NaiveDate,
    pub weight: Option<f64>, // kg
    #[serde(default, alias = "body_fat_percentage")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, alias = "muscle_mass")]
    pub muscle_mass: Option<f64>, // kg
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default, alias = "active_calories")]
    pub active_calories: Option<i64>,
    #[serde(default, alias = "resting_calories")]
    pub resting_calories: Option<i64>,
    #[serde(default, alias = "total_calories")]
    pub total_calories: Option<i64>,
    #[serde(default, alias = "protein_g")]
    pub protein_g: Option<f64>,
    #[serde(default, alias = "fat_g")]
    pub fat_g: Option<f64>,
    #[serde(default, alias = "carbohydrate_g")]
    pub carbohydrate_g: Option<f64>,
    #[serde(default, alias = "fiber_g")]
    pub fiber_g: Option<f64>,
    #[serde(default, alias = "sugar_g")]
    pub sugar_g: Option<f64>,
    #[serde(default, alias = "sodium_mg")]
    pub sodium_mg: Option<f64>,
    #[serde(default, alias = "created_at")]
    pub created_at: String,
    #[serde(default, alias = "updated_at")]
    pub updated_at: String,
}

/// Validated data for inserting or replacing a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecordCreate {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub steps: Option<i64>,
    pub active_calories: Option<i64>,
    pub resting_calories: Option<i64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

/// Partial update of an existing record (only `Some` fields change)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthRecordUpdate {
    pub weight: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub steps: Option<i64>,
    pub active_calories: Option<i64>,
    pub resting_calories: Option<i64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

/// Loosely-typed payload as pushed by phone shortcuts and the input form.
///
/// Keys may be camelCase or snake_case; integer metrics arrive as JSON numbers
/// and are checked for whole values during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordInput {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, alias = "body_fat_percentage")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, alias = "muscle_mass")]
    pub muscle_mass: Option<f64>,
    #[serde(default)]
    pub steps: Option<f64>,
    #[serde(default, alias = "active_calories")]
    pub active_calories: Option<f64>,
    #[serde(default, alias = "resting_calories")]
    pub resting_calories: Option<f64>,
    #[serde(default, alias = "protein_g")]
    pub protein_g: Option<f64>,
    #[serde(default, alias = "fat_g")]
    pub fat_g: Option<f64>,
    #[serde(default, alias = "carbohydrate_g")]
    pub carbohydrate_g: Option<f64>,
    #[serde(default, alias = "fiber_g")]
    pub fiber_g: Option<f64>,
    #[serde(default, alias = "sugar_g")]
    pub sugar_g: Option<f64>,
    #[serde(default, alias = "sodium_mg")]
    pub sodium_mg: Option<f64>,
}

/// Active plus resting energy; `None` only when both parts are missing.
///
/// Validated parts are bounded well below overflow; the sum saturates anyway.
pub fn derive_total_calories(active: Option<i64>, resting: Option<i64>) -> Option<i64> {
    match (active, resting) {
        (None, None) => None,
        (a, r) => Some(a.unwrap_or(0).saturating_add(r.unwrap_or(0))),
    }
}

impl HealthRecordInput {
    /// Parse a JSON object, trimming stray whitespace from keys first
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let serde_json::Value::Object(map) = value else {
            return Err(ValidationError::Malformed("payload must be a JSON object".to_string()));
        };

        let trimmed: serde_json::Map<String, serde_json::Value> = map
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v))
            .collect();

        serde_json::from_value(serde_json::Value::Object(trimmed))
            .map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Validate into a typed record. A missing or blank date means `today`.
    pub fn validate(self, today: NaiveDate) -> Result<HealthRecordCreate, ValidationError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => normalize_date_string(raw)
                .ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))?,
        };

        check_positive("weight", self.weight)?;
        check_positive("muscleMass", self.muscle_mass)?;
        if let Some(bf) = self.body_fat_percentage {
            if !(0.0..=100.0).contains(&bf) {
                return Err(ValidationError::field("bodyFatPercentage", "must be between 0 and 100"));
            }
        }
        let steps = check_count("steps", self.steps)?;
        let active_calories = check_count("activeCalories", self.active_calories)?;
        let resting_calories = check_count("restingCalories", self.resting_calories)?;
        check_non_negative("proteinG", self.protein_g)?;
        check_non_negative("fatG", self.fat_g)?;
        check_non_negative("carbohydrateG", self.carbohydrate_g)?;
        check_non_negative("fiberG", self.fiber_g)?;
        check_non_negative("sugarG", self.sugar_g)?;
        check_non_negative("sodiumMg", self.sodium_mg)?;

        Ok(HealthRecordCreate {
            date,
            weight: self.weight,
            body_fat_percentage: self.body_fat_percentage,
            muscle_mass: self.muscle_mass,
            steps,
            active_calories,
            resting_calories,
            protein_g: self.protein_g,
            fat_g: self.fat_g,
            carbohydrate_g: self.carbohydrate_g,
            fiber_g: self.fiber_g,
            sugar_g: self.sugar_g,
            sodium_mg: self.sodium_mg,
        })
    }
}

impl HealthRecordCreate {
    /// An empty day
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            weight: None,
            body_fat_percentage: None,
            muscle_mass: None,
            steps: None,
            active_calories: None,
            resting_calories: None,
            protein_g: None,
            fat_g: None,
            carbohydrate_g: None,
            fiber_g: None,
            sugar_g: None,
            sodium_mg: None,
        }
    }

    pub fn total_calories(&self) -> Option<i64> {
        derive_total_calories(self.active_calories, self.resting_calories)
    }

    /// Fill fields this submission left out from the stored day.
    ///
    /// Pushes for the same date arrive in pieces (body metrics in the morning,
    /// nutrition at night), so an upsert never erases what it didn't send.
    pub fn merged_with(self, existing: Option<&HealthRecord>) -> Self {
        let Some(e) = existing else {
            return self;
        };
        Self {
            date: self.date,
            weight: self.weight.or(e.weight),
            body_fat_percentage: self.body_fat_percentage.or(e.body_fat_percentage),
            muscle_mass: self.muscle_mass.or(e.muscle_mass),
            steps: self.steps.or(e.steps),
            active_calories: self.active_calories.or(e.active_calories),
            resting_calories: self.resting_calories.or(e.resting_calories),
            protein_g: self.protein_g.or(e.protein_g),
            fat_g: self.fat_g.or(e.fat_g),
            carbohydrate_g: self.carbohydrate_g.or(e.carbohydrate_g),
            fiber_g: self.fiber_g.or(e.fiber_g),
            sugar_g: self.sugar_g.or(e.sugar_g),
            sodium_mg: self.sodium_mg.or(e.sodium_mg),
        }
    }
}

impl HealthRecordUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("weight", self.weight)?;
        check_positive("muscleMass", self.muscle_mass)?;
        if let Some(bf) = self.body_fat_percentage {
            if !(0.0..=100.0).contains(&bf) {
                return Err(ValidationError::field("bodyFatPercentage", "must be between 0 and 100"));
            }
        }
        check_count_i64("steps", self.steps)?;
        check_count_i64("activeCalories", self.active_calories)?;
        check_count_i64("restingCalories", self.resting_calories)?;
        check_non_negative("proteinG", self.protein_g)?;
        check_non_negative("fatG", self.fat_g)?;
        check_non_negative("carbohydrateG", self.carbohydrate_g)?;
        check_non_negative("fiberG", self.fiber_g)?;
        check_non_negative("sugarG", self.sugar_g)?;
        check_non_negative("sodiumMg", self.sodium_mg)?;
        Ok(())
    }

    /// The full set of values after applying this update to `record`
    pub fn apply_to(&self, record: &HealthRecord) -> HealthRecordCreate {
        HealthRecordCreate {
            date: record.date,
            weight: self.weight.or(record.weight),
            body_fat_percentage: self.body_fat_percentage.or(record.body_fat_percentage),
            muscle_mass: self.muscle_mass.or(record.muscle_mass),
            steps: self.steps.or(record.steps),
            active_calories: self.active_calories.or(record.active_calories),
            resting_calories: self.resting_calories.or(record.resting_calories),
            protein_g: self.protein_g.or(record.protein_g),
            fat_g: self.fat_g.or(record.fat_g),
            carbohydrate_g: self.carbohydrate_g.or(record.carbohydrate_g),
            fiber_g: self.fiber_g.or(record.fiber_g),
            sugar_g: self.sugar_g.or(record.sugar_g),
            sodium_mg: self.sodium_mg.or(record.sodium_mg),
        }
    }
}

impl HealthRecord {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            weight: row.get("weight")?,
            body_fat_percentage: row.get("body_fat_percentage")?,
            muscle_mass: row.get("muscle_mass")?,
            steps: row.get("steps")?,
            active_calories: row.get("active_calories")?,
            resting_calories: row.get("resting_calories")?,
            total_calories: row.get("total_calories")?,
            protein_g: row.get("protein_g")?,
            fat_g: row.get("fat_g")?,
            carbohydrate_g: row.get("carbohydrate_g")?,
            fiber_g: row.get("fiber_g")?,
            sugar_g: row.get("sugar_g")?,
            sodium_mg: row.get("sodium_mg")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Build an unsaved record from validated values (used by the memory store)
    pub fn from_create(id: i64, data: &HealthRecordCreate, created_at: String, updated_at: String) -> Self {
        Self {
            id,
            date: data.date,
            weight: data.weight,
            body_fat_percentage: data.body_fat_percentage,
            muscle_mass: data.muscle_mass,
            steps: data.steps,
            active_calories: data.active_calories,
            resting_calories: data.resting_calories,
            total_calories: data.total_calories(),
            protein_g: data.protein_g,
            fat_g: data.fat_g,
            carbohydrate_g: data.carbohydrate_g,
            fiber_g: data.fiber_g,
            sugar_g: data.sugar_g,
            sodium_mg: data.sodium_mg,
            created_at,
            updated_at,
        }
    }

    /// Get a record by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM health_records WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the record for a calendar date
    pub fn get_by_date(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM health_records WHERE date = ?1")?;

        match stmt.query_row([date], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List records ordered by date
    pub fn list(conn: &Connection, limit: i64, offset: i64, order: SortOrder) -> DbResult<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM health_records ORDER BY date {} LIMIT ?1 OFFSET ?2",
            order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count all records
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM health_records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert or merge the record for `data.date`
    pub fn upsert(conn: &Connection, data: &HealthRecordCreate) -> DbResult<Self> {
        let existing = Self::get_by_date(conn, data.date)?;
        let merged = data.clone().merged_with(existing.as_ref());

        conn.execute(
            r#"
            INSERT INTO health_records (
                date, weight, body_fat_percentage, muscle_mass, steps,
                active_calories, resting_calories, total_calories,
                protein_g, fat_g, carbohydrate_g, fiber_g, sugar_g, sodium_mg
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(date) DO UPDATE SET
                weight = excluded.weight,
                body_fat_percentage = excluded.body_fat_percentage,
                muscle_mass = excluded.muscle_mass,
                steps = excluded.steps,
                active_calories = excluded.active_calories,
                resting_calories = excluded.resting_calories,
                total_calories = excluded.total_calories,
                protein_g = excluded.protein_g,
                fat_g = excluded.fat_g,
                carbohydrate_g = excluded.carbohydrate_g,
                fiber_g = excluded.fiber_g,
                sugar_g = excluded.sugar_g,
                sodium_mg = excluded.sodium_mg,
                updated_at = datetime('now')
            "#,
            params![
                merged.date,
                merged.weight,
                merged.body_fat_percentage,
                merged.muscle_mass,
                merged.steps,
                merged.active_calories,
                merged.resting_calories,
                merged.total_calories(),
                merged.protein_g,
                merged.fat_g,
                merged.carbohydrate_g,
                merged.fiber_g,
                merged.sugar_g,
                merged.sodium_mg,
            ],
        )?;

        Self::get_by_date(conn, merged.date)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Update a record by ID
    pub fn update(conn: &Connection, id: i64, data: &HealthRecordUpdate) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };
        if data.is_empty() {
            return Ok(Some(existing));
        }

        let values = data.apply_to(&existing);
        conn.execute(
            r#"
            UPDATE health_records SET
                weight = ?1,
                body_fat_percentage = ?2,
                muscle_mass = ?3,
                steps = ?4,
                active_calories = ?5,
                resting_calories = ?6,
                total_calories = ?7,
                protein_g = ?8,
                fat_g = ?9,
                carbohydrate_g = ?10,
                fiber_g = ?11,
                sugar_g = ?12,
                sodium_mg = ?13,
                updated_at = datetime('now')
            WHERE id = ?14
            "#,
            params![
                values.weight,
                values.body_fat_percentage,
                values.muscle_mass,
                values.steps,
                values.active_calories,
                values.resting_calories,
                values.total_calories(),
                values.protein_g,
                values.fat_g,
                values.carbohydrate_g,
                values.fiber_g,
                values.sugar_g,
                values.sodium_mg,
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Delete a record
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM health_records WHERE id = ?1", [id])?;
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
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!(" Oldest ".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert_eq!("".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_total_calories_derivation() {
        assert_eq!(derive_total_calories(Some(500), Some(1500)), Some(2000));
        assert_eq!(derive_total_calories(Some(500), None), Some(500));
        assert_eq!(derive_total_calories(None, Some(1500)), Some(1500));
        assert_eq!(derive_total_calories(None, None), None);
        assert_eq!(derive_total_calories(Some(i64::MAX), Some(1)), Some(i64::MAX));
    }

    #[test]
    fn test_oversized_energy_counts_rejected() {
        let today = date(2025, 8, 1);
        let input = HealthRecordInput::from_json(json!({ "activeCalories": 1e19, "restingCalories": 1 })).unwrap();
        assert!(matches!(
            input.validate(today),
            Err(ValidationError::Field { field: "activeCalories", .. })
        ));

        let update = HealthRecordUpdate {
            resting_calories: Some(i64::MAX),
            ..HealthRecordUpdate::default()
        };
        assert!(matches!(
            update.validate(),
            Err(ValidationError::Field { field: "restingCalories", .. })
        ));
    }

    #[test]
    fn test_input_trims_keys_and_accepts_both_casings() {
        let payload = json!({
            " date ": "2025/07/26 23:50",
            "weight": 104.2,
            "body_fat_percentage": 28.5,
            "proteinG": 120.0,
            "activeCalories": 450,
        });
        let input = HealthRecordInput::from_json(payload).unwrap();
        let record = input.validate(date(2025, 8, 1)).unwrap();
        assert_eq!(record.date, date(2025, 7, 26));
        assert_eq!(record.weight, Some(104.2));
        assert_eq!(record.body_fat_percentage, Some(28.5));
        assert_eq!(record.protein_g, Some(120.0));
        assert_eq!(record.active_calories, Some(450));
        assert_eq!(record.total_calories(), Some(450));
    }

    #[test]
    fn test_input_missing_date_defaults_to_today() {
        let input = HealthRecordInput::from_json(json!({ "steps": 9000 })).unwrap();
        let record = input.validate(date(2025, 8, 1)).unwrap();
        assert_eq!(record.date, date(2025, 8, 1));
        assert_eq!(record.steps, Some(9000));
    }

    #[test]
    fn test_input_rejections() {
        let today = date(2025, 8, 1);
        let cases = [
            json!({ "date": "not a date" }),
            json!({ "weight": -3.0 }),
            json!({ "bodyFatPercentage": 120.0 }),
            json!({ "steps": 12.5 }),
            json!({ "restingCalories": -1 }),
            json!({ "fatG": -0.1 }),
        ];
        for payload in cases {
            let input = HealthRecordInput::from_json(payload.clone()).unwrap();
            assert!(input.validate(today).is_err(), "accepted {}", payload);
        }

        assert!(matches!(
            HealthRecordInput::from_json(json!([1, 2])),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            HealthRecordInput::from_json(json!({ "weight": "heavy" })),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_upsert_merges_by_date() {
        let conn = test_conn();
        let day = date(2025, 7, 28);

        let morning = HealthRecordCreate {
            weight: Some(104.0),
            steps: Some(3000),
            ..HealthRecordCreate::for_date(day)
        };
        let first = HealthRecord::upsert(&conn, &morning).unwrap();

        let night = HealthRecordCreate {
            steps: Some(9500),
            protein_g: Some(110.0),
            active_calories: Some(400),
            resting_calories: Some(1800),
            ..HealthRecordCreate::for_date(day)
        };
        let second = HealthRecord::upsert(&conn, &night).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.weight, Some(104.0));
        assert_eq!(second.steps, Some(9500));
        assert_eq!(second.protein_g, Some(110.0));
        assert_eq!(second.total_calories, Some(2200));
        assert_eq!(HealthRecord::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_list_order_and_paging() {
        let conn = test_conn();
        for d in [26, 27, 28] {
            let data = HealthRecordCreate {
                weight: Some(100.0 + d as f64),
                ..HealthRecordCreate::for_date(date(2025, 7, d))
            };
            HealthRecord::upsert(&conn, &data).unwrap();
        }

        let desc = HealthRecord::list(&conn, 10, 0, SortOrder::Desc).unwrap();
        assert_eq!(desc[0].date, date(2025, 7, 28));

        let asc = HealthRecord::list(&conn, 2, 1, SortOrder::Asc).unwrap();
        assert_eq!(asc.len(), 2);
        assert_eq!(asc[0].date, date(2025, 7, 27));
    }

    #[test]
    fn test_update_and_delete() {
        let conn = test_conn();
        let created = HealthRecord::upsert(
            &conn,
            &HealthRecordCreate {
                active_calories: Some(300),
                ..HealthRecordCreate::for_date(date(2025, 7, 28))
            },
        )
        .unwrap();

        let update = HealthRecordUpdate {
            resting_calories: Some(1700),
            ..Default::default()
        };
        let updated = HealthRecord::update(&conn, created.id, &update).unwrap().unwrap();
        assert_eq!(updated.active_calories, Some(300));
        assert_eq!(updated.total_calories, Some(2000));

        assert!(HealthRecord::update(&conn, 9999, &update).unwrap().is_none());
        assert!(HealthRecord::delete(&conn, created.id).unwrap());
        assert!(HealthRecord::get_by_date(&conn, date(2025, 7, 28)).unwrap().is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = HealthRecord::from_create(
            1,
            &HealthRecordCreate {
                body_fat_percentage: Some(27.0),
                ..HealthRecordCreate::for_date(date(2025, 7, 28))
            },
            String::new(),
            String::new(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date"], "2025-07-28");
        assert_eq!(value["bodyFatPercentage"], 27.0);
    }
}
