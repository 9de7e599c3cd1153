//! Health Record MCP Tools
//!
//! Tools for pushing and browsing daily health records.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{HealthRecord, HealthRecordInput, HealthRecordUpdate, SortOrder};
use crate::progress::dates::normalize_date_string;
use crate::storage::{FindManyOptions, Stores};

/// Upper bound for a single listing page
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Response for record_health_data
#[derive(Debug, Serialize)]
pub struct RecordHealthDataResponse {
    pub id: i64,
    pub date: NaiveDate,
    pub created: bool, // false when merged into an existing day
    pub record: HealthRecord,
}

/// Response for list_health_records
#[derive(Debug, Serialize)]
pub struct ListHealthRecordsResponse {
    pub records: Vec<HealthRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub order: SortOrder,
}

/// Response for delete_health_record
#[derive(Debug, Serialize)]
pub struct DeleteHealthRecordResponse {
    pub id: i64,
    pub deleted: bool,
}

/// Parse a date argument in any of the accepted input formats
pub(crate) fn parse_date_arg(date: &str) -> Result<NaiveDate, String> {
    normalize_date_string(date).ok_or_else(|| format!("Invalid date '{}': expected YYYY-MM-DD", date))
}

// ============================================================================
// Record Tools
// ============================================================================

/// Validate a raw payload and store it, merging into the day if it exists.
///
/// A payload without a date is recorded for `today`.
pub fn record_health_data(
    stores: &Stores,
    payload: serde_json::Value,
    today: NaiveDate,
) -> Result<RecordHealthDataResponse, String> {
    let data = HealthRecordInput::from_json(payload)
        .and_then(|input| input.validate(today))
        .map_err(|e| format!("Invalid health data: {}", e))?;

    let existed = stores
        .records
        .find_by_date(data.date)
        .map_err(|e| format!("Failed to check existing record: {}", e))?
        .is_some();

    let record = stores
        .records
        .upsert(&data)
        .map_err(|e| format!("Failed to save health data: {}", e))?;

    tracing::info!(date = %record.date, merged = existed, "Recorded health data");

    Ok(RecordHealthDataResponse {
        id: record.id,
        date: record.date,
        created: !existed,
        record,
    })
}

/// Get the record for one day
pub fn get_health_record(stores: &Stores, date: &str) -> Result<Option<HealthRecord>, String> {
    let date = parse_date_arg(date)?;
    stores
        .records
        .find_by_date(date)
        .map_err(|e| format!("Failed to get health record: {}", e))
}

/// List records by date
pub fn list_health_records(
    stores: &Stores,
    limit: i64,
    offset: i64,
    order: SortOrder,
) -> Result<ListHealthRecordsResponse, String> {
    let limit = limit.min(MAX_PAGE_SIZE).max(1);
    let offset = offset.max(0);

    let records = stores
        .records
        .find_many(&FindManyOptions { limit, offset, order })
        .map_err(|e| format!("Failed to list health records: {}", e))?;

    let total = stores
        .records
        .count()
        .map_err(|e| format!("Failed to count health records: {}", e))?;

    Ok(ListHealthRecordsResponse {
        records,
        total,
        limit,
        offset,
        order,
    })
}

/// Change individual fields of a stored record
pub fn update_health_record(
    stores: &Stores,
    id: i64,
    update: HealthRecordUpdate,
) -> Result<HealthRecord, String> {
    let record = stores
        .records
        .update(id, &update)
        .map_err(|e| format!("Failed to update health record: {}", e))?
        .ok_or_else(|| format!("Health record not found: {}", id))?;

    tracing::info!(id, date = %record.date, "Updated health record");
    Ok(record)
}

/// Delete a record
pub fn delete_health_record(stores: &Stores, id: i64) -> Result<DeleteHealthRecordResponse, String> {
    let deleted = stores
        .records
        .delete(id)
        .map_err(|e| format!("Failed to delete health record: {}", e))?;

    if !deleted {
        return Err(format!("Health record not found: {}", id));
    }

    tracing::info!(id, "Deleted health record");
    Ok(DeleteHealthRecordResponse { id, deleted })
}
