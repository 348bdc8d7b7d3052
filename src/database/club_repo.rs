use sqlx::SqliteExecutor;

use crate::models::{Category, ClubCounterAuditRow, ClubsRow, CredentialsRow};

const SQL_INSERT_CLUB: &str = r#"
INSERT INTO clubs (club_id, email, name, password_hash, club_type, description, faculty_in_charge)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub struct NewClub<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub club_type: Category,
    pub description: &'a str,
    pub faculty_in_charge: Option<&'a str>,
}

pub async fn insert_club<'e>(
    executor: impl SqliteExecutor<'e>,
    club: NewClub<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_CLUB)
        .bind(club.id)
        .bind(club.email)
        .bind(club.name)
        .bind(club.password_hash)
        .bind(club.club_type)
        .bind(club.description)
        .bind(club.faculty_in_charge)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_CLUB: &str = r#"
SELECT
  club_id,
  email,
  name,
  club_type,
  description,
  faculty_in_charge,
  total_events,
  pending_verification,
  upcoming_events,
  created_at
FROM clubs
WHERE club_id = ?1
LIMIT 1
"#;

pub async fn load_club<'e>(
    executor: impl SqliteExecutor<'e>,
    club_id: &str,
) -> sqlx::Result<Option<ClubsRow>> {
    sqlx::query_as::<_, ClubsRow>(SQL_LOAD_CLUB)
        .bind(club_id)
        .fetch_optional(executor)
        .await
}

const SQL_LOAD_CREDENTIALS: &str = r#"
SELECT club_id AS id, name, email, password_hash
FROM clubs
WHERE email = ?1
LIMIT 1
"#;

pub async fn load_credentials<'e>(
    executor: impl SqliteExecutor<'e>,
    email: &str,
) -> sqlx::Result<Option<CredentialsRow>> {
    sqlx::query_as::<_, CredentialsRow>(SQL_LOAD_CREDENTIALS)
        .bind(email)
        .fetch_optional(executor)
        .await
}

const SQL_LIST_CLUBS: &str = r#"
SELECT
  club_id,
  email,
  name,
  club_type,
  description,
  faculty_in_charge,
  total_events,
  pending_verification,
  upcoming_events,
  created_at
FROM clubs
ORDER BY name ASC
"#;

pub async fn list_clubs<'e>(executor: impl SqliteExecutor<'e>) -> sqlx::Result<Vec<ClubsRow>> {
    sqlx::query_as::<_, ClubsRow>(SQL_LIST_CLUBS)
        .fetch_all(executor)
        .await
}

/// Signed adjustments applied to a club's denormalised event counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub total_events: i64,
    pub pending_verification: i64,
    pub upcoming_events: i64,
}

const SQL_ADJUST_COUNTERS: &str = r#"
UPDATE clubs
SET total_events = total_events + ?2,
    pending_verification = pending_verification + ?3,
    upcoming_events = upcoming_events + ?4
WHERE club_id = ?1
"#;

pub async fn adjust_counters<'e>(
    executor: impl SqliteExecutor<'e>,
    club_id: &str,
    delta: CounterDelta,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_ADJUST_COUNTERS)
        .bind(club_id)
        .bind(delta.total_events)
        .bind(delta.pending_verification)
        .bind(delta.upcoming_events)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_COUNTERS: &str = r#"
UPDATE clubs
SET total_events = ?2,
    pending_verification = ?3,
    upcoming_events = ?4
WHERE club_id = ?1
"#;

pub async fn set_counters<'e>(
    executor: impl SqliteExecutor<'e>,
    club_id: &str,
    total_events: i64,
    pending_verification: i64,
    upcoming_events: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_COUNTERS)
        .bind(club_id)
        .bind(total_events)
        .bind(pending_verification)
        .bind(upcoming_events)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_AUDIT_COUNTERS: &str = r#"
SELECT
  c.club_id,
  c.total_events,
  c.pending_verification,
  c.upcoming_events,
  (SELECT COUNT(*) FROM events e WHERE e.club_id = c.club_id) AS actual_total,
  (SELECT COUNT(*) FROM events e WHERE e.club_id = c.club_id AND e.status = 'pending') AS actual_pending,
  (SELECT COUNT(*) FROM events e WHERE e.club_id = c.club_id AND e.status = 'upcoming') AS actual_upcoming
FROM clubs c
ORDER BY c.club_id ASC
"#;

pub async fn audit_counters<'e>(
    executor: impl SqliteExecutor<'e>,
) -> sqlx::Result<Vec<ClubCounterAuditRow>> {
    sqlx::query_as::<_, ClubCounterAuditRow>(SQL_AUDIT_COUNTERS)
        .fetch_all(executor)
        .await
}
