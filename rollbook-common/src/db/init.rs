//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently on every start.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enrollment and attendance rows cascade from their session
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers while one writer commits
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_sessions_table(pool).await?;
    create_enrollments_table(pool).await?;
    create_attendance_table(pool).await?;
    Ok(())
}

/// Create the sessions table
///
/// One row per recurring weekly class, with its precomputed recurrence
/// descriptor. Deletion is a soft delete via `is_deleted`.
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            term TEXT NOT NULL,
            day_of_week TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            location TEXT NOT NULL,
            city TEXT NOT NULL,
            location_url TEXT,
            capacity INTEGER NOT NULL,
            min_age INTEGER NOT NULL,
            max_age INTEGER NOT NULL,
            rrule TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (end_date >= start_date),
            CHECK (capacity > 0),
            CHECK (min_age < max_age)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_start_date ON sessions(start_date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the enrollments table
///
/// Waitlist entries with a lifecycle status. `admitted_at` is set once at
/// insert time.
pub async fn create_enrollments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            guid TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(guid) ON DELETE CASCADE,
            student_name TEXT NOT NULL,
            student_email TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'waitlisted'
                CHECK (status IN ('waitlisted', 'admitted', 'withdrawn')),
            admitted_at TIMESTAMP NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (session_id, student_email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_enrollments_session ON enrollments(session_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the attendance table
///
/// At most one row per (session, enrollment, date); bulk reconciliation
/// relies on the uniqueness constraint staying in place.
pub async fn create_attendance_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            guid TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(guid) ON DELETE CASCADE,
            enrollment_id TEXT NOT NULL REFERENCES enrollments(guid) ON DELETE CASCADE,
            date TEXT NOT NULL,
            is_present INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (session_id, enrollment_id, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attendance_session_date ON attendance(session_id, date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
