//! Database migrations
//!
//! Versioned schema creation.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: health records and goals
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- HEALTH RECORDS
        -- One row per calendar day (upsert key: date)
        -- ============================================
        CREATE TABLE health_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL UNIQUE,           -- ISO date: "2025-07-26"

            -- Body
            weight REAL,                         -- kg
            body_fat_percentage REAL CHECK(body_fat_percentage BETWEEN 0 AND 100),
            muscle_mass REAL,                    -- kg

            -- Activity
            steps INTEGER CHECK(steps >= 0),
            active_calories INTEGER CHECK(active_calories >= 0),
            resting_calories INTEGER CHECK(resting_calories >= 0),
            total_calories INTEGER,              -- active + resting

            -- Nutrition
            protein_g REAL,
            fat_g REAL,
            carbohydrate_g REAL,
            fiber_g REAL,
            sugar_g REAL,
            sodium_mg REAL,

            -- Metadata
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- GOALS
        -- Weight / nutrition plans
        -- ============================================
        CREATE TABLE goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            target_weight_kg REAL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,

            -- Daily bands (either bound may be open)
            daily_calorie_intake_min REAL,
            daily_calorie_intake_max REAL,
            daily_protein_min_g REAL,
            daily_protein_max_g REAL,
            daily_fat_min_g REAL,
            daily_fat_max_g REAL,
            daily_carb_min_g REAL,
            daily_carb_max_g REAL,
            daily_steps_target INTEGER,

            is_active INTEGER NOT NULL DEFAULT 1,  -- boolean

            -- Metadata
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            CHECK (start_date <= end_date)
        );

        CREATE INDEX idx_goals_active ON goals(is_active, created_at);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    Ok(get_schema_version(conn)? < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_goal_period_check() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO goals (name, start_date, end_date) VALUES ('x', '2025-09-30', '2025-07-26')",
            [],
        );
        assert!(result.is_err());
    }
}
