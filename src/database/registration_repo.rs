use serde::Serialize;
use sqlx::SqliteExecutor;

use crate::models::{EventStatus, StudentRefRow};

const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO event_registrations (event_id, student_id)
VALUES (?1, ?2)
"#;

pub async fn insert_registration<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
    student_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(event_id)
        .bind(student_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_IS_REGISTERED: &str = r#"
SELECT EXISTS(
  SELECT 1 FROM event_registrations WHERE event_id = ?1 AND student_id = ?2
)
"#;

pub async fn is_registered<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
    student_id: &str,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(SQL_IS_REGISTERED)
        .bind(event_id)
        .bind(student_id)
        .fetch_one(executor)
        .await
}

const SQL_COUNT_REGISTRATIONS: &str = r#"
SELECT COUNT(*) FROM event_registrations WHERE event_id = ?1
"#;

pub async fn count_registrations<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_REGISTRATIONS)
        .bind(event_id)
        .fetch_one(executor)
        .await
}

const SQL_LIST_REGISTERED_STUDENTS: &str = r#"
SELECT s.student_id, s.name, s.email, s.usn
FROM event_registrations r
JOIN students s ON s.student_id = r.student_id
WHERE r.event_id = ?1
ORDER BY r.registered_at ASC, s.usn ASC
"#;

pub async fn list_registered_students<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
) -> sqlx::Result<Vec<StudentRefRow>> {
    sqlx::query_as::<_, StudentRefRow>(SQL_LIST_REGISTERED_STUDENTS)
        .bind(event_id)
        .fetch_all(executor)
        .await
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentRegistrationRow {
    pub event_id: String,
    pub title: String,
    pub event_date: String,
    pub status: EventStatus,
    pub registered_at: String,
}

const SQL_LIST_STUDENT_REGISTRATIONS: &str = r#"
SELECT e.event_id, e.title, e.event_date, e.status, r.registered_at
FROM event_registrations r
JOIN events e ON e.event_id = r.event_id
WHERE r.student_id = ?1
ORDER BY e.event_date DESC
"#;

pub async fn list_student_registrations<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
) -> sqlx::Result<Vec<StudentRegistrationRow>> {
    sqlx::query_as::<_, StudentRegistrationRow>(SQL_LIST_STUDENT_REGISTRATIONS)
        .bind(student_id)
        .fetch_all(executor)
        .await
}
