use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::{Category, EventListingRow, EventStatus, EventsRow};

const EVENT_COLUMNS: &str = r#"
  e.event_id,
  e.club_id,
  e.title,
  e.description,
  e.event_date,
  e.event_time,
  e.venue,
  e.activity_point,
  e.category,
  e.max_participants,
  e.status,
  e.verified,
  e.participants,
  e.form_link,
  e.deadline,
  e.created_at,
  e.updated_at
"#;

const SQL_INSERT_EVENT: &str = r#"
INSERT INTO events (
  event_id,
  club_id,
  title,
  description,
  event_date,
  event_time,
  venue,
  activity_point,
  category,
  max_participants,
  form_link,
  deadline,
  status
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 'pending')
"#;

pub struct NewEvent<'a> {
    pub id: &'a str,
    pub club_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub event_date: &'a str,
    pub event_time: &'a str,
    pub venue: &'a str,
    pub activity_point: i64,
    pub category: Category,
    pub max_participants: Option<i64>,
    pub form_link: Option<&'a str>,
    pub deadline: Option<&'a str>,
}

pub async fn insert_event<'e>(
    executor: impl SqliteExecutor<'e>,
    event: NewEvent<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_EVENT)
        .bind(event.id)
        .bind(event.club_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(event.venue)
        .bind(event.activity_point)
        .bind(event.category)
        .bind(event.max_participants)
        .bind(event.form_link)
        .bind(event.deadline)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_event<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
) -> sqlx::Result<Option<EventsRow>> {
    let sql = format!(
        "SELECT {} FROM events e WHERE e.event_id = ?1 LIMIT 1",
        EVENT_COLUMNS
    );
    sqlx::query_as::<_, EventsRow>(&sql)
        .bind(event_id)
        .fetch_optional(executor)
        .await
}

pub async fn load_event_listing<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
) -> sqlx::Result<Option<EventListingRow>> {
    let sql = format!(
        r#"
SELECT {},
  c.name AS club_name,
  c.email AS club_email,
  (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.event_id) AS registered_count
FROM events e
JOIN clubs c ON c.club_id = e.club_id
WHERE e.event_id = ?1
LIMIT 1
"#,
        EVENT_COLUMNS
    );
    sqlx::query_as::<_, EventListingRow>(&sql)
        .bind(event_id)
        .fetch_optional(executor)
        .await
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub club_id: Option<String>,
    pub category: Option<Category>,
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a EventFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        qb.push(" AND e.status = ").push_bind(status);
    }
    if let Some(club_id) = filter.club_id.as_deref() {
        qb.push(" AND e.club_id = ").push_bind(club_id);
    }
    if let Some(category) = filter.category {
        qb.push(" AND e.category = ").push_bind(category);
    }
}

pub async fn count_events<'e>(
    executor: impl SqliteExecutor<'e>,
    filter: &EventFilter,
) -> sqlx::Result<i64> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM events e");
    push_filter(&mut qb, filter);
    qb.build_query_scalar::<i64>().fetch_one(executor).await
}

/// Newest event date first.
pub async fn list_events<'e>(
    executor: impl SqliteExecutor<'e>,
    filter: &EventFilter,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<EventListingRow>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        r#"
SELECT {},
  c.name AS club_name,
  c.email AS club_email,
  (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.event_id) AS registered_count
FROM events e
JOIN clubs c ON c.club_id = e.club_id"#,
        EVENT_COLUMNS
    ));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY e.event_date DESC, e.created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    qb.build_query_as::<EventListingRow>()
        .fetch_all(executor)
        .await
}

const SQL_APPROVE_EVENT: &str = r#"
UPDATE events
SET status = 'upcoming',
    verified = 1,
    updated_at = datetime('now')
WHERE event_id = ?1
  AND status = 'pending'
"#;

/// Returns 0 when the event was no longer pending.
pub async fn approve_event<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_APPROVE_EVENT)
        .bind(event_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_STATUS: &str = r#"
UPDATE events
SET status = ?3,
    updated_at = datetime('now')
WHERE event_id = ?1
  AND status = ?2
"#;

/// Compare-and-set on the status column; 0 rows means another request won.
pub async fn update_status<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
    from: EventStatus,
    to: EventStatus,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_STATUS)
        .bind(event_id)
        .bind(from)
        .bind(to)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_ADD_PARTICIPANTS: &str = r#"
UPDATE events
SET participants = participants + ?2,
    updated_at = datetime('now')
WHERE event_id = ?1
"#;

pub async fn add_participants<'e>(
    executor: impl SqliteExecutor<'e>,
    event_id: &str,
    count: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_ADD_PARTICIPANTS)
        .bind(event_id)
        .bind(count)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
