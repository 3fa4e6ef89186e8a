//! Session scheduling
//!
//! Sessions own their recurrence descriptor: every create or schedule
//! change recomputes it before the row is persisted, so the stored
//! descriptor always reflects the stored date/time/weekday columns.

use chrono::{NaiveDate, NaiveTime};
use rollbook_common::db::models::{EnrollmentStatus, Session};
use rollbook_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::calendar::rrule::generate_rrule;

/// Combined envelope of a set of term date ranges.
///
/// The session workflow schedules across every selected term: the range
/// starts at the earliest term start and ends at the latest term end.
pub fn combined_date_range(ranges: &[(NaiveDate, NaiveDate)]) -> Option<(NaiveDate, NaiveDate)> {
    let start = ranges.iter().map(|(start, _)| *start).min()?;
    let end = ranges.iter().map(|(_, end)| *end).max()?;
    Some((start, end))
}

/// Input for creating a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub title: String,
    pub term: String,
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
}

/// Partial schedule update; unset fields keep their stored values
#[derive(Debug, Clone, Default)]
pub struct ScheduleChange {
    pub day_of_week: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Session store over the shared pool
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a session with its computed recurrence descriptor.
    ///
    /// All input validation happens before anything is written.
    pub async fn create(&self, new: &NewSession) -> Result<Session> {
        if new.capacity <= 0 {
            return Err(Error::InvalidInput("capacity must be positive".to_string()));
        }

        if new.min_age >= new.max_age {
            return Err(Error::InvalidInput(
                "maximum age must be greater than minimum age".to_string(),
            ));
        }

        // Validates the weekday name and the date/time ordering
        let rrule = generate_rrule(
            new.start_date,
            new.end_date,
            new.start_time,
            new.end_time,
            &new.day_of_week,
        )?;

        let guid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO sessions (guid, title, term, day_of_week, start_date, end_date, \
             start_time, end_time, location, city, location_url, capacity, min_age, max_age, rrule) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&guid)
        .bind(&new.title)
        .bind(&new.term)
        .bind(&new.day_of_week)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.location)
        .bind(&new.city)
        .bind(&new.location_url)
        .bind(new.capacity)
        .bind(new.min_age)
        .bind(new.max_age)
        .bind(&rrule)
        .execute(&self.pool)
        .await?;

        info!("Session created: {}", guid);

        self.fetch(&guid).await
    }

    /// Fetch a live (not soft-deleted) session
    pub async fn fetch(&self, session_id: &str) -> Result<Session> {
        sqlx::query_as(
            "SELECT guid, title, term, day_of_week, start_date, end_date, start_time, end_time, \
             location, city, location_url, capacity, min_age, max_age, rrule, is_deleted \
             FROM sessions WHERE guid = ? AND is_deleted = 0",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("session {} not found", session_id)))
    }

    /// Apply a schedule change and recompute the stored descriptor.
    ///
    /// The descriptor is regenerated from the merged values whenever any
    /// of the scheduling inputs changes, keeping anchor and rule in step
    /// with the row.
    pub async fn update_schedule(
        &self,
        session_id: &str,
        change: &ScheduleChange,
    ) -> Result<Session> {
        let current = self.fetch(session_id).await?;

        let day_of_week = change
            .day_of_week
            .clone()
            .unwrap_or(current.day_of_week);
        let start_date = change.start_date.unwrap_or(current.start_date);
        let end_date = change.end_date.unwrap_or(current.end_date);
        let start_time = change.start_time.unwrap_or(current.start_time);
        let end_time = change.end_time.unwrap_or(current.end_time);

        let rrule = generate_rrule(start_date, end_date, start_time, end_time, &day_of_week)?;

        sqlx::query(
            "UPDATE sessions SET day_of_week = ?, start_date = ?, end_date = ?, start_time = ?, \
             end_time = ?, rrule = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
        )
        .bind(&day_of_week)
        .bind(start_date)
        .bind(end_date)
        .bind(start_time)
        .bind(end_time)
        .bind(&rrule)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        info!("Session updated: {}", session_id);

        self.fetch(session_id).await
    }

    /// Soft delete a session, withdrawing every active enrollment.
    ///
    /// Runs as one transaction; returns the number of enrollments
    /// withdrawn.
    pub async fn soft_delete(&self, session_id: &str) -> Result<u64> {
        // Surface NotFound before opening a transaction
        self.fetch(session_id).await?;

        let mut tx = self.pool.begin().await?;

        let withdrawn = sqlx::query(
            "UPDATE enrollments SET status = ? WHERE session_id = ? AND status IN (?, ?)",
        )
        .bind(EnrollmentStatus::Withdrawn.as_str())
        .bind(session_id)
        .bind(EnrollmentStatus::Waitlisted.as_str())
        .bind(EnrollmentStatus::Admitted.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "UPDATE sessions SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Session {} marked as deleted, {} enrollments withdrawn",
            session_id, withdrawn
        );

        Ok(withdrawn)
    }
}
