use sqlx::SqliteExecutor;

use crate::models::{
    Category, ParticipationHistoryRow, ParticipationRow, ParticipationStatus, StudentRefRow,
};

const SQL_LOAD_ENTRY: &str = r#"
SELECT event_id, student_id, points, category, status, recorded_by, recorded_at, verified_at
FROM participation_history
WHERE event_id = ?1
  AND student_id = ?2
LIMIT 1
"#;

pub async fn load_entry<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
    student_id: &str,
) -> sqlx::Result<Option<ParticipationRow>> {
    sqlx::query_as::<_, ParticipationRow>(SQL_LOAD_ENTRY)
        .bind(event_id)
        .bind(student_id)
        .fetch_optional(executor)
        .await
}

const SQL_INSERT_ENTRY: &str = r#"
INSERT INTO participation_history (
  event_id,
  student_id,
  points,
  category,
  status,
  recorded_by,
  verified_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, CASE WHEN ?5 = 'verified' THEN datetime('now') END)
"#;

pub struct NewParticipation<'a> {
    pub event_id: &'a str,
    pub student_id: &'a str,
    pub points: i64,
    pub category: Category,
    pub status: ParticipationStatus,
    pub recorded_by: &'a str,
}

pub async fn insert_entry<'e>(
    executor: impl SqliteExecutor<'e>,
    entry: NewParticipation<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ENTRY)
        .bind(entry.event_id)
        .bind(entry.student_id)
        .bind(entry.points)
        .bind(entry.category)
        .bind(entry.status)
        .bind(entry.recorded_by)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_MARK_VERIFIED: &str = r#"
UPDATE participation_history
SET status = 'verified',
    recorded_by = ?3,
    verified_at = datetime('now')
WHERE event_id = ?1
  AND student_id = ?2
  AND status = 'pending'
"#;

pub async fn mark_verified<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
    student_id: &str,
    verified_by: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_VERIFIED)
        .bind(event_id)
        .bind(student_id)
        .bind(verified_by)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_STUDENT_HISTORY: &str = r#"
SELECT
  p.event_id,
  e.title AS event_title,
  e.event_date,
  p.points,
  p.category,
  p.status,
  p.recorded_at,
  p.verified_at
FROM participation_history p
JOIN events e ON e.event_id = p.event_id
WHERE p.student_id = ?1
ORDER BY p.recorded_at DESC, e.event_date DESC
"#;

pub async fn list_student_history<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
) -> sqlx::Result<Vec<ParticipationHistoryRow>> {
    sqlx::query_as::<_, ParticipationHistoryRow>(SQL_LIST_STUDENT_HISTORY)
        .bind(student_id)
        .fetch_all(executor)
        .await
}

const SQL_LIST_PARTICIPANTS: &str = r#"
SELECT s.student_id, s.name, s.email, s.usn
FROM participation_history p
JOIN students s ON s.student_id = p.student_id
WHERE p.event_id = ?1
ORDER BY s.usn ASC
"#;

pub async fn list_participants<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
) -> sqlx::Result<Vec<StudentRefRow>> {
    sqlx::query_as::<_, StudentRefRow>(SQL_LIST_PARTICIPANTS)
        .bind(event_id)
        .fetch_all(executor)
        .await
}
