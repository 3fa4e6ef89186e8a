//! Database row models

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A recurring weekly class session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub guid: String,
    pub title: String,
    /// Label of the primary term this session runs in
    pub term: String,
    /// Full weekday name ("Monday" .. "Sunday")
    pub day_of_week: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub city: String,
    pub location_url: Option<String>,
    pub capacity: i64,
    pub min_age: i64,
    pub max_age: i64,
    /// Persisted recurrence descriptor (anchor + weekly rule)
    pub rrule: String,
    pub is_deleted: bool,
}

/// Enrollment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Waitlisted,
    Admitted,
    Withdrawn,
}

impl EnrollmentStatus {
    /// Status as stored in the `enrollments.status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Waitlisted => "waitlisted",
            EnrollmentStatus::Admitted => "admitted",
            EnrollmentStatus::Withdrawn => "withdrawn",
        }
    }

    /// Parse a stored status value
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "waitlisted" => Ok(EnrollmentStatus::Waitlisted),
            "admitted" => Ok(EnrollmentStatus::Admitted),
            "withdrawn" => Ok(EnrollmentStatus::Withdrawn),
            other => Err(Error::Format(format!("unknown enrollment status: {}", other))),
        }
    }
}

/// A student's waitlist entry for one session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    pub guid: String,
    pub session_id: String,
    pub student_name: String,
    pub student_email: String,
    /// One of the [`EnrollmentStatus`] values
    pub status: String,
    /// First-persist instant, read as the admission time by attendance
    /// inference
    pub admitted_at: NaiveDateTime,
}

/// Per-date attendance row
///
/// At most one row exists per (session, enrollment, date); the database
/// enforces this with a uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub guid: String,
    pub session_id: String,
    pub enrollment_id: String,
    pub date: NaiveDate,
    pub is_present: bool,
}
