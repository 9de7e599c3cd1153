//! Storage capability interface
//!
//! Tools and the dashboard only see these traits; the concrete backend is
//! picked once at startup from configuration.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::{AppConfig, StorageBackend};
use crate::db::{migrations, Database, DbError};
use crate::models::{
    Goal, GoalCreate, GoalUpdate, HealthRecord, HealthRecordCreate, HealthRecordUpdate, SortOrder,
    ValidationError,
};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Default page size for `find_many`
pub const DEFAULT_FIND_LIMIT: i64 = 100;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Paging and ordering for `HealthRecordStore::find_many`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindManyOptions {
    pub limit: i64,
    pub offset: i64,
    pub order: SortOrder,
}

impl Default for FindManyOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FIND_LIMIT,
            offset: 0,
            order: SortOrder::Desc,
        }
    }
}

impl FindManyOptions {
    /// The `limit` most recent days
    pub fn latest(limit: i64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

/// Daily health records keyed by date
pub trait HealthRecordStore: Send + Sync {
    fn find_by_date(&self, date: NaiveDate) -> StoreResult<Option<HealthRecord>>;

    fn find_many(&self, options: &FindManyOptions) -> StoreResult<Vec<HealthRecord>>;

    /// Insert the day, or merge into the existing record for that date
    fn upsert(&self, data: &HealthRecordCreate) -> StoreResult<HealthRecord>;

    /// `Ok(None)` when no record has this id
    fn update(&self, id: i64, data: &HealthRecordUpdate) -> StoreResult<Option<HealthRecord>>;

    fn delete(&self, id: i64) -> StoreResult<bool>;

    fn count(&self) -> StoreResult<i64>;
}

/// Goal definitions
pub trait GoalStore: Send + Sync {
    fn create_goal(&self, data: &GoalCreate) -> StoreResult<Goal>;

    fn get_goal(&self, id: i64) -> StoreResult<Option<Goal>>;

    /// Newest first (`created_at`, then id)
    fn list_goals(&self, active_only: bool) -> StoreResult<Vec<Goal>>;

    fn update_goal(&self, id: i64, data: &GoalUpdate) -> StoreResult<Option<Goal>>;

    fn delete_goal(&self, id: i64) -> StoreResult<bool>;
}

/// The stores handed to tools and the MCP service
#[derive(Clone)]
pub struct Stores {
    pub records: Arc<dyn HealthRecordStore>,
    pub goals: Arc<dyn GoalStore>,
    pub backend: StorageBackend,
}

impl Stores {
    /// SQLite-backed stores sharing one pool
    pub fn sqlite(database: Database) -> Self {
        let store = Arc::new(SqliteStore::new(database));
        Self {
            records: store.clone(),
            goals: store,
            backend: StorageBackend::Sqlite,
        }
    }

    /// Process-local stores; nothing survives a restart
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            records: store.clone(),
            goals: store,
            backend: StorageBackend::Memory,
        }
    }

    /// Build the configured backend, creating and migrating the database
    /// file when SQLite is selected
    pub fn from_config(config: &AppConfig) -> StoreResult<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on exit");
                Ok(Self::memory())
            }
            StorageBackend::Sqlite => {
                let db_path = &config.database_path;
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let database = Database::new(db_path)?;
                database.with_conn(|conn| {
                    migrations::run_migrations(conn)?;
                    let version = migrations::get_schema_version(conn)?;
                    tracing::info!(path = %db_path.display(), version, "Database ready");
                    Ok(())
                })?;

                Ok(Self::sqlite(database))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sqlite_stores() -> Stores {
        let database = Database::in_memory().unwrap();
        database
            .with_conn(|conn| migrations::run_migrations(conn))
            .unwrap();
        Stores::sqlite(database)
    }

    /// Exercise the record interface; both backends must agree
    fn check_record_store(store: &dyn HealthRecordStore) {
        let day = date(2025, 7, 28);
        let morning = HealthRecordCreate {
            weight: Some(104.0),
            active_calories: Some(300),
            ..HealthRecordCreate::for_date(day)
        };
        let first = store.upsert(&morning).unwrap();
        assert_eq!(first.total_calories, Some(300));

        let night = HealthRecordCreate {
            protein_g: Some(110.0),
            resting_calories: Some(1700),
            ..HealthRecordCreate::for_date(day)
        };
        let merged = store.upsert(&night).unwrap();
        assert_eq!(merged.id, first.id);
        assert_eq!(merged.weight, Some(104.0));
        assert_eq!(merged.protein_g, Some(110.0));
        assert_eq!(merged.total_calories, Some(2000));
        assert_eq!(store.count().unwrap(), 1);

        for d in [26, 27, 29] {
            store
                .upsert(&HealthRecordCreate {
                    weight: Some(100.0 + d as f64),
                    ..HealthRecordCreate::for_date(date(2025, 7, d))
                })
                .unwrap();
        }

        let latest = store.find_many(&FindManyOptions::default()).unwrap();
        let dates: Vec<u32> = latest.iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(dates, vec![29, 28, 27, 26]);

        let page = store
            .find_many(&FindManyOptions {
                limit: 2,
                offset: 1,
                order: SortOrder::Asc,
            })
            .unwrap();
        assert_eq!(page.iter().map(|r| r.date).collect::<Vec<_>>(), vec![date(2025, 7, 27), date(2025, 7, 28)]);

        let update = HealthRecordUpdate {
            steps: Some(8000),
            ..Default::default()
        };
        let updated = store.update(merged.id, &update).unwrap().unwrap();
        assert_eq!(updated.steps, Some(8000));
        assert_eq!(updated.weight, Some(104.0));
        assert!(store.update(9999, &update).unwrap().is_none());

        let bad = HealthRecordUpdate {
            steps: Some(-1),
            ..Default::default()
        };
        assert!(matches!(store.update(merged.id, &bad), Err(StoreError::Validation(_))));

        assert!(store.delete(merged.id).unwrap());
        assert!(!store.delete(merged.id).unwrap());
        assert!(store.find_by_date(day).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 3);
    }

    fn check_goal_store(store: &dyn GoalStore) {
        let mut data = GoalCreate::new("Main diet", date(2025, 7, 26), date(2025, 9, 30));
        data.target_weight_kg = Some(100.0);
        let first = store.create_goal(&data).unwrap();
        let second = store.create_goal(&GoalCreate::new("Maintenance", date(2025, 10, 1), date(2025, 12, 31))).unwrap();

        let all = store.list_goals(false).unwrap();
        assert_eq!(all.iter().map(|g| g.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        let update = GoalUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let paused = store.update_goal(second.id, &update).unwrap().unwrap();
        assert!(!paused.is_active);
        assert_eq!(paused.name, "Maintenance");

        let active = store.list_goals(true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, first.id);

        let inverted = GoalUpdate {
            start_date: Some(date(2026, 1, 1)),
            ..Default::default()
        };
        assert!(matches!(store.update_goal(first.id, &inverted), Err(StoreError::Validation(_))));
        assert!(store.update_goal(9999, &update).unwrap().is_none());

        let invalid = GoalCreate::new("", date(2025, 7, 26), date(2025, 9, 30));
        assert!(matches!(store.create_goal(&invalid), Err(StoreError::Validation(_))));

        assert!(store.delete_goal(second.id).unwrap());
        assert!(store.get_goal(second.id).unwrap().is_none());
        assert_eq!(store.get_goal(first.id).unwrap().unwrap().target_weight_kg, Some(100.0));
    }

    #[test]
    fn test_memory_record_store() {
        check_record_store(Stores::memory().records.as_ref());
    }

    #[test]
    fn test_sqlite_record_store() {
        check_record_store(sqlite_stores().records.as_ref());
    }

    #[test]
    fn test_memory_goal_store() {
        check_goal_store(Stores::memory().goals.as_ref());
    }

    #[test]
    fn test_sqlite_goal_store() {
        check_goal_store(sqlite_stores().goals.as_ref());
    }

    #[test]
    fn test_from_config_memory() {
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let stores = Stores::from_config(&config).unwrap();
        assert_eq!(stores.backend, StorageBackend::Memory);
        assert_eq!(stores.records.count().unwrap(), 0);
    }
}
