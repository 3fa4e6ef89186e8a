//! Unit tests for database initialization
//!
//! Covers automatic creation, idempotent schema setup, and the
//! constraints the attendance engine relies on.

use rollbook_common::db::init_database;
use std::path::PathBuf;

fn test_db_path(name: &str) -> PathBuf {
    PathBuf::from(format!(
        "/tmp/rollbook-test-db-{}-{}.db",
        name,
        std::process::id()
    ))
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let db_path = test_db_path("create");
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let db_path = test_db_path("existing");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_idempotent_initialization() {
    let db_path = test_db_path("idempotent");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await.unwrap();

    let count1: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
            .fetch_one(&pool1)
            .await
            .unwrap();

    drop(pool1);

    let pool2 = init_database(&db_path).await.unwrap();

    let count2: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
            .fetch_one(&pool2)
            .await
            .unwrap();

    assert_eq!(count1, count2, "Table count changed on second initialization");

    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_expected_tables_exist() {
    let db_path = test_db_path("tables");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    for table in ["sessions", "enrollments", "attendance"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(exists, "Table '{}' not created", table);
    }

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_attendance_uniqueness_constraint() {
    let db_path = test_db_path("unique");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    sqlx::query(
        "INSERT INTO sessions (guid, title, term, day_of_week, start_date, end_date, start_time, \
         end_time, location, city, capacity, min_age, max_age, rrule) \
         VALUES ('s1', 'Coding Club', 'Spring 2025', 'Tuesday', '2025-01-07', '2025-03-25', \
         '16:00:00', '17:30:00', 'Main Hall', 'Dublin', 20, 8, 14, \
         'DTSTART:20250107T160000\nRRULE:FREQ=WEEKLY;BYDAY=TU;UNTIL=20250325T173000')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO enrollments (guid, session_id, student_name, student_email, status, admitted_at) \
         VALUES ('e1', 's1', 'Ada Byrne', 'ada@example.com', 'admitted', '2025-01-07 10:00:00')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO attendance (guid, session_id, enrollment_id, date, is_present) \
         VALUES ('a1', 's1', 'e1', '2025-01-14', 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    // Second row for the same (session, enrollment, date) must be rejected
    let duplicate = sqlx::query(
        "INSERT INTO attendance (guid, session_id, enrollment_id, date, is_present) \
         VALUES ('a2', 's1', 'e1', '2025-01-14', 0)",
    )
    .execute(&pool)
    .await;

    assert!(duplicate.is_err(), "Duplicate attendance row was accepted");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_enrollment_requires_session() {
    let db_path = test_db_path("fk");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let fk_enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fk_enabled, 1, "Foreign keys should be enabled");

    let orphan = sqlx::query(
        "INSERT INTO enrollments (guid, session_id, student_name, student_email, status, admitted_at) \
         VALUES ('e1', 'no-such-session', 'Ada Byrne', 'ada@example.com', 'waitlisted', \
         '2025-01-07 10:00:00')",
    )
    .execute(&pool)
    .await;

    assert!(orphan.is_err(), "Enrollment without a session was accepted");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_enrollment_status_check_constraint() {
    let db_path = test_db_path("status-check");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    sqlx::query(
        "INSERT INTO sessions (guid, title, term, day_of_week, start_date, end_date, start_time, \
         end_time, location, city, capacity, min_age, max_age, rrule) \
         VALUES ('s1', 'Coding Club', 'Spring 2025', 'Tuesday', '2025-01-07', '2025-03-25', \
         '16:00:00', '17:30:00', 'Main Hall', 'Dublin', 20, 8, 14, 'x')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let bad_status = sqlx::query(
        "INSERT INTO enrollments (guid, session_id, student_name, student_email, status, admitted_at) \
         VALUES ('e1', 's1', 'Ada Byrne', 'ada@example.com', 'expelled', '2025-01-07 10:00:00')",
    )
    .execute(&pool)
    .await;

    assert!(bad_status.is_err(), "Unknown enrollment status was accepted");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}
