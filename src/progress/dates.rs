//! Calendar date resolution
//!
//! The nutrition app that feeds this dashboard pushes a day's totals shortly
//! before midnight Japan time, so "yesterday" is always computed in a fixed
//! UTC+9 offset rather than in the host's local zone.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};

/// Default reporting offset: UTC+9 (JST, no DST)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// The default reporting offset as a `FixedOffset`
pub fn default_offset() -> FixedOffset {
    offset_from_hours(DEFAULT_UTC_OFFSET_HOURS).unwrap_or_else(|| Utc.fix())
}

/// Build a fixed offset from whole hours east of UTC
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        return None;
    }
    FixedOffset::east_opt(hours * 3600)
}

/// Wall-clock date at `now` in the given offset
pub fn resolve_today_in(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// The calendar day before `resolve_today_in(now, offset)`
pub fn resolve_yesterday_in(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let today = resolve_today_in(now, offset);
    today.pred_opt().unwrap_or(today)
}

/// Today in the default UTC+9 offset
pub fn resolve_today(now: DateTime<Utc>) -> NaiveDate {
    resolve_today_in(now, default_offset())
}

/// Yesterday in the default UTC+9 offset
pub fn resolve_yesterday(now: DateTime<Utc>) -> NaiveDate {
    resolve_yesterday_in(now, default_offset())
}

/// Signed number of whole days from `earlier` to `later`
pub fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// `date` shifted by a signed number of days, saturating at the calendar limits
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs())).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs())).unwrap_or(NaiveDate::MIN)
    }
}

/// Parse the loose date formats phone shortcuts send.
///
/// Accepts `2025-07-26`, `2025/07/26 13:23` and `2025-07-26T13:23:00+09:00`;
/// anything after the date part is ignored.
pub fn normalize_date_string(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let date_part = trimmed
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(trimmed)
        .replace('/', "-");

    NaiveDate::parse_from_str(&date_part, "%Y-%m-%d").ok()
}
