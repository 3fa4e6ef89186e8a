//! Enrollment lifecycle
//!
//! Waitlist entries move waitlisted -> admitted -> withdrawn. Deleting a
//! session force-withdraws every entry that is still active.

use chrono::NaiveDateTime;
use rollbook_common::db::models::{Enrollment, EnrollmentStatus};
use rollbook_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Status an enrollment moves to when its session is deleted.
///
/// Active entries are forced to withdrawn; already-withdrawn entries are
/// unchanged.
pub fn status_after_session_delete(current: EnrollmentStatus) -> EnrollmentStatus {
    match current {
        EnrollmentStatus::Waitlisted | EnrollmentStatus::Admitted => EnrollmentStatus::Withdrawn,
        EnrollmentStatus::Withdrawn => EnrollmentStatus::Withdrawn,
    }
}

/// Apply the session-delete transition to a whole enrollment set.
pub fn withdraw_all(entries: &[Enrollment]) -> Result<Vec<Enrollment>> {
    entries
        .iter()
        .map(|entry| {
            let current = EnrollmentStatus::parse(&entry.status)?;
            let mut next = entry.clone();
            next.status = status_after_session_delete(current).as_str().to_string();
            Ok(next)
        })
        .collect()
}

/// Enrollment store over the shared pool
pub struct EnrollmentRepository {
    pool: SqlitePool,
}

impl EnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a student to the waitlist of a session.
    ///
    /// `admitted_at` is persisted once here and later read as the
    /// admission time by attendance inference.
    pub async fn enroll(
        &self,
        session_id: &str,
        student_name: &str,
        student_email: &str,
        admitted_at: NaiveDateTime,
    ) -> Result<Enrollment> {
        let session_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE guid = ? AND is_deleted = 0)",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        if !session_exists {
            return Err(Error::NotFound(format!("session {} not found", session_id)));
        }

        let already_registered: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE session_id = ? AND student_email = ?)",
        )
        .bind(session_id)
        .bind(student_email)
        .fetch_one(&self.pool)
        .await?;

        if already_registered {
            return Err(Error::InvalidInput(
                "student is already registered for this session".to_string(),
            ));
        }

        let guid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO enrollments (guid, session_id, student_name, student_email, status, admitted_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&guid)
        .bind(session_id)
        .bind(student_name)
        .bind(student_email)
        .bind(EnrollmentStatus::Waitlisted.as_str())
        .bind(admitted_at)
        .execute(&self.pool)
        .await?;

        info!(
            "Student {} added to waitlist for session {}",
            student_email, session_id
        );

        self.fetch(&guid).await
    }

    /// Update one entry's lifecycle status
    pub async fn set_status(
        &self,
        enrollment_id: &str,
        status: EnrollmentStatus,
    ) -> Result<Enrollment> {
        let result = sqlx::query("UPDATE enrollments SET status = ? WHERE guid = ?")
            .bind(status.as_str())
            .bind(enrollment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "enrollment {} not found",
                enrollment_id
            )));
        }

        info!(
            "Enrollment {} status updated to {}",
            enrollment_id,
            status.as_str()
        );

        self.fetch(enrollment_id).await
    }

    /// Admitted entries for a session, admission order
    pub async fn admitted_for_session(&self, session_id: &str) -> Result<Vec<Enrollment>> {
        let entries = sqlx::query_as(
            "SELECT guid, session_id, student_name, student_email, status, admitted_at \
             FROM enrollments WHERE session_id = ? AND status = ? ORDER BY admitted_at ASC",
        )
        .bind(session_id)
        .bind(EnrollmentStatus::Admitted.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every entry for a session, admission order
    pub async fn roster(&self, session_id: &str) -> Result<Vec<Enrollment>> {
        let entries = sqlx::query_as(
            "SELECT guid, session_id, student_name, student_email, status, admitted_at \
             FROM enrollments WHERE session_id = ? ORDER BY admitted_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn fetch(&self, enrollment_id: &str) -> Result<Enrollment> {
        sqlx::query_as(
            "SELECT guid, session_id, student_name, student_email, status, admitted_at \
             FROM enrollments WHERE guid = ?",
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("enrollment {} not found", enrollment_id)))
    }
}
