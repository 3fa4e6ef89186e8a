//! Attendance reconciliation
//!
//! Write paths make the persisted rows for a (session, date) scope match a
//! submitted set exactly: delete the scope, insert the submitted rows, one
//! transaction. Re-applying the same payload leaves the same final row
//! set. Concurrent calls over overlapping scopes are last-commit-wins.

use chrono::NaiveDate;
use rollbook_common::db::models::{AttendanceRecord, Enrollment, EnrollmentStatus};
use rollbook_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::attendance::infer::{day_statuses, DayStatus};

/// Submitted presence for one enrollment on an implied date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayEntry {
    pub enrollment_id: String,
    pub is_present: bool,
}

/// Submitted presence for one enrollment on an explicit date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatedEntry {
    pub date: NaiveDate,
    pub enrollment_id: String,
    pub is_present: bool,
}

/// Attendance store over the shared pool
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Mark or update attendance for one student on one date.
    ///
    /// Updates the existing row in place when one exists, inserts
    /// otherwise, so the uniqueness constraint never trips under a single
    /// writer.
    pub async fn mark(
        &self,
        session_id: &str,
        enrollment_id: &str,
        date: NaiveDate,
        is_present: bool,
    ) -> Result<AttendanceRecord> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT guid FROM attendance WHERE session_id = ? AND enrollment_id = ? AND date = ?",
        )
        .bind(session_id)
        .bind(enrollment_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        let guid = match existing {
            Some(guid) => {
                sqlx::query("UPDATE attendance SET is_present = ? WHERE guid = ?")
                    .bind(is_present)
                    .bind(&guid)
                    .execute(&self.pool)
                    .await?;
                guid
            }
            None => {
                let guid = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO attendance (guid, session_id, enrollment_id, date, is_present) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&guid)
                .bind(session_id)
                .bind(enrollment_id)
                .bind(date)
                .bind(is_present)
                .execute(&self.pool)
                .await?;
                guid
            }
        };

        Ok(AttendanceRecord {
            guid,
            session_id: session_id.to_string(),
            enrollment_id: enrollment_id.to_string(),
            date,
            is_present,
        })
    }

    /// Replace every record in the (session, date) scope with the
    /// submitted set.
    ///
    /// Runs as one transaction; an empty `entries` list clears the scope.
    pub async fn reconcile_date(
        &self,
        session_id: &str,
        date: NaiveDate,
        entries: &[DayEntry],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM attendance WHERE session_id = ? AND date = ?")
            .bind(session_id)
            .bind(date)
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO attendance (guid, session_id, enrollment_id, date, is_present) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(session_id)
            .bind(&entry.enrollment_id)
            .bind(date)
            .bind(entry.is_present)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Reconciled attendance for session {} on {}: {} records",
            session_id,
            date,
            entries.len()
        );

        Ok(entries.len())
    }

    /// Replace the records for every date present in the payload.
    ///
    /// Equivalent to applying [`Self::reconcile_date`] once per distinct
    /// date, but deletes across all dates in one statement and inserts
    /// inside a single transaction over the whole payload.
    pub async fn reconcile_dates(
        &self,
        session_id: &str,
        entries: &[DatedEntry],
    ) -> Result<usize> {
        let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        dates.sort_unstable();
        dates.dedup();

        // The scope is derived from the payload; nothing submitted means
        // nothing to touch
        if dates.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let placeholders = vec!["?"; dates.len()].join(", ");
        let delete_sql = format!(
            "DELETE FROM attendance WHERE session_id = ? AND date IN ({})",
            placeholders
        );
        let mut delete = sqlx::query(&delete_sql).bind(session_id);
        for date in &dates {
            delete = delete.bind(date);
        }
        delete.execute(&mut *tx).await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO attendance (guid, session_id, enrollment_id, date, is_present) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(session_id)
            .bind(&entry.enrollment_id)
            .bind(entry.date)
            .bind(entry.is_present)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Reconciled attendance for session {} across {} dates: {} records",
            session_id,
            dates.len(),
            entries.len()
        );

        Ok(entries.len())
    }

    /// Explicit-or-inferred status for every admitted enrollment on `date`.
    pub async fn day_roster(
        &self,
        session_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Vec<DayStatus>> {
        let admitted: Vec<Enrollment> = sqlx::query_as(
            "SELECT guid, session_id, student_name, student_email, status, admitted_at \
             FROM enrollments WHERE session_id = ? AND status = ? ORDER BY admitted_at ASC",
        )
        .bind(session_id)
        .bind(EnrollmentStatus::Admitted.as_str())
        .fetch_all(&self.pool)
        .await?;

        let records: Vec<AttendanceRecord> = sqlx::query_as(
            "SELECT guid, session_id, enrollment_id, date, is_present \
             FROM attendance WHERE session_id = ? AND date = ?",
        )
        .bind(session_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(day_statuses(&admitted, &records, date, today))
    }

    /// All attendance records for a session
    pub async fn session_records(&self, session_id: &str) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as(
            "SELECT guid, session_id, enrollment_id, date, is_present \
             FROM attendance WHERE session_id = ? ORDER BY date ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Attendance records for one student in a session
    pub async fn enrollment_records(
        &self,
        session_id: &str,
        enrollment_id: &str,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as(
            "SELECT guid, session_id, enrollment_id, date, is_present \
             FROM attendance WHERE session_id = ? AND enrollment_id = ? ORDER BY date ASC",
        )
        .bind(session_id)
        .bind(enrollment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Delete one record by id.
    ///
    /// Returns false when no such record exists.
    pub async fn delete(&self, attendance_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE guid = ?")
            .bind(attendance_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
