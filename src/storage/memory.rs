//! In-memory store
//!
//! Same contract as the SQLite store, held in `BTreeMap`s behind `RwLock`s.
//! Used for the `memory` backend and as the fake in tool tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};

use crate::models::{
    Goal, GoalCreate, GoalUpdate, HealthRecord, HealthRecordCreate, HealthRecordUpdate, SortOrder,
};
use super::{FindManyOptions, GoalStore, HealthRecordStore, StoreError, StoreResult};

/// Timestamp in the same shape SQLite's `datetime('now')` produces
fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StoreError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StoreError::LockPoisoned)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<NaiveDate, HealthRecord>>,
    goals: RwLock<BTreeMap<i64, Goal>>,
    next_record_id: AtomicI64,
    next_goal_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl HealthRecordStore for MemoryStore {
    fn find_by_date(&self, date: NaiveDate) -> StoreResult<Option<HealthRecord>> {
        Ok(read(&self.records)?.get(&date).cloned())
    }

    fn find_many(&self, options: &FindManyOptions) -> StoreResult<Vec<HealthRecord>> {
        let records = read(&self.records)?;
        let skip = options.offset.max(0) as usize;
        let take = options.limit.max(0) as usize;

        let page: Vec<HealthRecord> = match options.order {
            SortOrder::Asc => records.values().skip(skip).take(take).cloned().collect(),
            SortOrder::Desc => records.values().rev().skip(skip).take(take).cloned().collect(),
        };
        Ok(page)
    }

    fn upsert(&self, data: &HealthRecordCreate) -> StoreResult<HealthRecord> {
        let mut records = write(&self.records)?;
        let now = now_timestamp();

        let record = match records.get(&data.date) {
            Some(existing) => {
                let merged = data.clone().merged_with(Some(existing));
                HealthRecord::from_create(existing.id, &merged, existing.created_at.clone(), now)
            }
            None => {
                let id = Self::allocate(&self.next_record_id);
                HealthRecord::from_create(id, data, now.clone(), now)
            }
        };

        records.insert(record.date, record.clone());
        tracing::debug!(date = %record.date, id = record.id, "Upserted health record");
        Ok(record)
    }

    fn update(&self, id: i64, data: &HealthRecordUpdate) -> StoreResult<Option<HealthRecord>> {
        data.validate()?;
        let mut records = write(&self.records)?;

        let Some(existing) = records.values_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if !data.is_empty() {
            let values = data.apply_to(existing);
            *existing = HealthRecord::from_create(id, &values, existing.created_at.clone(), now_timestamp());
        }
        Ok(Some(existing.clone()))
    }

    fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut records = write(&self.records)?;
        let before = records.len();
        records.retain(|_, r| r.id != id);
        Ok(records.len() < before)
    }

    fn count(&self) -> StoreResult<i64> {
        Ok(read(&self.records)?.len() as i64)
    }
}

impl GoalStore for MemoryStore {
    fn create_goal(&self, data: &GoalCreate) -> StoreResult<Goal> {
        data.validate()?;
        let id = Self::allocate(&self.next_goal_id);
        let now = now_timestamp();
        let goal = Goal::from_create(id, data, now.clone(), now);
        write(&self.goals)?.insert(id, goal.clone());
        Ok(goal)
    }

    fn get_goal(&self, id: i64) -> StoreResult<Option<Goal>> {
        Ok(read(&self.goals)?.get(&id).cloned())
    }

    fn list_goals(&self, active_only: bool) -> StoreResult<Vec<Goal>> {
        let mut goals: Vec<Goal> = read(&self.goals)?
            .values()
            .filter(|g| !active_only || g.is_active)
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(goals)
    }

    fn update_goal(&self, id: i64, data: &GoalUpdate) -> StoreResult<Option<Goal>> {
        let mut goals = write(&self.goals)?;
        let Some(existing) = goals.get_mut(&id) else {
            return Ok(None);
        };
        let merged = data.apply_to(existing)?;
        *existing = Goal::from_create(id, &merged, existing.created_at.clone(), now_timestamp());
        Ok(Some(existing.clone()))
    }

    fn delete_goal(&self, id: i64) -> StoreResult<bool> {
        Ok(write(&self.goals)?.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable_across_upserts() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 7, 26).unwrap();
        let a = store.upsert(&HealthRecordCreate::for_date(day)).unwrap();
        let b = store
            .upsert(&HealthRecordCreate {
                weight: Some(103.0),
                ..HealthRecordCreate::for_date(day)
            })
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 1);
        assert_eq!(b.created_at, a.created_at);

        let next = store
            .upsert(&HealthRecordCreate::for_date(day.succ_opt().unwrap()))
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_paging_past_end_is_empty() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 7, 26).unwrap();
        store.upsert(&HealthRecordCreate::for_date(day)).unwrap();
        let page = store
            .find_many(&FindManyOptions {
                offset: 5,
                ..FindManyOptions::default()
            })
            .unwrap();
        assert!(page.is_empty());
    }
}
