//! SQLite-backed store

use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{Goal, GoalCreate, GoalUpdate, HealthRecord, HealthRecordCreate, HealthRecordUpdate};
use super::{FindManyOptions, GoalStore, HealthRecordStore, StoreResult};

/// Records and goals persisted through the connection pool
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl HealthRecordStore for SqliteStore {
    fn find_by_date(&self, date: NaiveDate) -> StoreResult<Option<HealthRecord>> {
        Ok(self.db.with_conn(|conn| HealthRecord::get_by_date(conn, date))?)
    }

    fn find_many(&self, options: &FindManyOptions) -> StoreResult<Vec<HealthRecord>> {
        Ok(self
            .db
            .with_conn(|conn| HealthRecord::list(conn, options.limit, options.offset, options.order))?)
    }

    fn upsert(&self, data: &HealthRecordCreate) -> StoreResult<HealthRecord> {
        // Read-merge-write must not interleave with another push for the same day
        let record = self.db.with_transaction(|tx| HealthRecord::upsert(tx, data))?;
        tracing::debug!(date = %record.date, id = record.id, "Upserted health record");
        Ok(record)
    }

    fn update(&self, id: i64, data: &HealthRecordUpdate) -> StoreResult<Option<HealthRecord>> {
        data.validate()?;
        Ok(self.db.with_transaction(|tx| HealthRecord::update(tx, id, data))?)
    }

    fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.db.with_conn(|conn| HealthRecord::delete(conn, id))?)
    }

    fn count(&self) -> StoreResult<i64> {
        Ok(self.db.with_conn(HealthRecord::count)?)
    }
}

impl GoalStore for SqliteStore {
    fn create_goal(&self, data: &GoalCreate) -> StoreResult<Goal> {
        data.validate()?;
        Ok(self.db.with_conn(|conn| Goal::create(conn, data))?)
    }

    fn get_goal(&self, id: i64) -> StoreResult<Option<Goal>> {
        Ok(self.db.with_conn(|conn| Goal::get_by_id(conn, id))?)
    }

    fn list_goals(&self, active_only: bool) -> StoreResult<Vec<Goal>> {
        Ok(self.db.with_conn(|conn| Goal::list(conn, active_only))?)
    }

    fn update_goal(&self, id: i64, data: &GoalUpdate) -> StoreResult<Option<Goal>> {
        let Some(existing) = self.get_goal(id)? else {
            return Ok(None);
        };
        let merged = data.apply_to(&existing)?;
        Ok(self.db.with_conn(|conn| Goal::update(conn, id, &merged))?)
    }

    fn delete_goal(&self, id: i64) -> StoreResult<bool> {
        Ok(self.db.with_conn(|conn| Goal::delete(conn, id))?)
    }
}
