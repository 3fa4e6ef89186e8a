//! Attendance status inference
//!
//! Backfills attendance history for dates with no explicit record: a
//! student already enrolled on a class date that has passed counts as
//! present; future dates and dates before admission count as absent. An
//! explicit record always wins over the inferred value.

use chrono::{NaiveDate, NaiveDateTime};
use rollbook_common::db::models::{AttendanceRecord, Enrollment};
use serde::Serialize;

/// Inferred presence for one enrollment and class date.
///
/// Present iff the enrollment was admitted on or before the date and the
/// date has already occurred as of `today`.
pub fn inferred_presence(
    admitted_at: NaiveDateTime,
    target_date: NaiveDate,
    today: NaiveDate,
) -> bool {
    let was_admitted_before = admitted_at.date() <= target_date;
    let has_occurred = target_date <= today;
    was_admitted_before && has_occurred
}

/// Attendance status for one enrollment on one date
#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    pub enrollment_id: String,
    pub date: NaiveDate,
    pub is_present: bool,
    /// True when an explicit record exists for this date
    pub recorded: bool,
}

/// One status per admitted enrollment for `target_date`.
///
/// Explicit records for the date override inference.
pub fn day_statuses(
    admitted: &[Enrollment],
    records: &[AttendanceRecord],
    target_date: NaiveDate,
    today: NaiveDate,
) -> Vec<DayStatus> {
    admitted
        .iter()
        .map(|enrollment| {
            match records.iter().find(|r| r.enrollment_id == enrollment.guid) {
                Some(record) => DayStatus {
                    enrollment_id: enrollment.guid.clone(),
                    date: target_date,
                    is_present: record.is_present,
                    recorded: true,
                },
                None => DayStatus {
                    enrollment_id: enrollment.guid.clone(),
                    date: target_date,
                    is_present: inferred_presence(enrollment.admitted_at, target_date, today),
                    recorded: false,
                },
            }
        })
        .collect()
}
