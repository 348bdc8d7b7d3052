use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::club_repo::{self, CounterDelta};
use crate::database::event_repo::{self, EventFilter};
use crate::database::{begin_write, participation_repo, registration_repo, student_repo};
use crate::error::{AppError, AppResult};
use crate::models::{Category, EventListingRow, EventStatus, EventsRow, Role, StudentRefRow};
use crate::services::access::{self, Actor, Capability};
use crate::services::points_service::MAX_AWARD_POINTS;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, Default)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "date")]
    pub event_date: String,
    #[serde(default, alias = "time")]
    pub event_time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(alias = "points")]
    pub activity_point: Option<i64>,
    #[serde(default)]
    pub category: String,
    #[serde(alias = "maxParticipants")]
    pub max_participants: Option<i64>,
    #[serde(alias = "formLink")]
    pub form_link: Option<String>,
    pub deadline: Option<String>,
    #[serde(alias = "club")]
    pub club_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListEventsQuery {
    pub status: Option<String>,
    #[serde(alias = "club")]
    pub club_id: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: EventsRow,
    pub club: ClubRef,
    pub registered_count: i64,
}

impl From<EventListingRow> for EventView {
    fn from(row: EventListingRow) -> Self {
        EventView {
            club: ClubRef {
                id: row.event.club_id.clone(),
                name: row.club_name,
                email: row.club_email,
            },
            registered_count: row.registered_count,
            event: row.event,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Pagination {
            total,
            page,
            limit,
            pages,
        }
    }

    pub fn offset(&self) -> AppResult<i64> {
        page_offset(self.page, self.limit)
    }
}

/// Row offset of a 1-based page. Pages too far out to address are a bad
/// request rather than an arithmetic overflow.
pub fn page_offset(page: i64, limit: i64) -> AppResult<i64> {
    page.checked_sub(1)
        .and_then(|skipped| skipped.checked_mul(limit))
        .ok_or_else(|| AppError::bad_request("Page number is too large"))
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub events: Vec<EventView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub event_id: String,
    pub registered_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationsView {
    pub event_id: String,
    pub title: String,
    pub max_participants: Option<i64>,
    pub registered_students: Vec<StudentRefRow>,
    pub participants_list: Vec<StudentRefRow>,
}

fn required(value: &str, message: &'static str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(message));
    }
    Ok(trimmed.to_string())
}

fn parse_date(raw: &str, field: &str) -> AppResult<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| AppError::bad_request(format!("Invalid {}, expected YYYY-MM-DD", field)))
}

fn parse_time(raw: &str) -> AppResult<String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| AppError::bad_request("Invalid time, expected HH:MM"))
}

struct ValidatedEvent {
    title: String,
    description: String,
    event_date: String,
    event_time: String,
    venue: String,
    activity_point: i64,
    category: Category,
    max_participants: Option<i64>,
    form_link: Option<String>,
    deadline: Option<String>,
}

fn validate(req: &CreateEventRequest) -> AppResult<ValidatedEvent> {
    const MISSING: &str = "All required fields must be provided";

    let title = required(&req.title, MISSING)?;
    let description = required(&req.description, MISSING)?;
    let venue = required(&req.venue, MISSING)?;
    required(&req.event_date, MISSING)?;
    required(&req.event_time, MISSING)?;
    required(&req.category, MISSING)?;
    let Some(activity_point) = req.activity_point else {
        return Err(AppError::bad_request(MISSING));
    };
    if activity_point < 1 {
        return Err(AppError::bad_request("Points must be at least 1"));
    }
    if activity_point > MAX_AWARD_POINTS {
        return Err(AppError::bad_request(format!(
            "Points must not exceed {}",
            MAX_AWARD_POINTS
        )));
    }

    let category: Category = req.category.parse().map_err(AppError::bad_request)?;
    let event_date = parse_date(&req.event_date, "date")?;
    let event_time = parse_time(&req.event_time)?;

    // 0 means unlimited, matching clients that send an empty numeric field.
    let max_participants = match req.max_participants {
        None | Some(0) => None,
        Some(n) if n < 0 => {
            return Err(AppError::bad_request(
                "Max participants must be a positive number",
            ))
        }
        Some(n) => Some(n),
    };

    let deadline = match req.deadline.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let deadline = parse_date(raw, "deadline")?;
            if deadline > event_date {
                return Err(AppError::bad_request(
                    "Registration deadline cannot be after the event date",
                ));
            }
            Some(deadline)
        }
    };

    let form_link = req
        .form_link
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ValidatedEvent {
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
    })
}

async fn load_view(pool: &SqlitePool, event_id: &str) -> AppResult<EventView> {
    event_repo::load_event_listing(pool, event_id)
        .await?
        .map(EventView::from)
        .ok_or_else(|| AppError::not_found("Event not found"))
}

pub async fn create_event(
    pool: &SqlitePool,
    actor: Actor<'_>,
    req: CreateEventRequest,
) -> AppResult<EventView> {
    access::authorize(actor, Capability::CreateEvent)?;

    let club_id = match actor.role {
        Role::Club => actor.id.to_string(),
        _ => req
            .club_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("Club ID is required for admin event creation"))?,
    };
    let event = validate(&req)?;

    if club_repo::load_club(pool, &club_id).await?.is_none() {
        return Err(AppError::not_found("Club not found"));
    }

    let event_id = Uuid::new_v4().to_string();
    let mut tx = begin_write(pool).await?;
    event_repo::insert_event(
        &mut *tx,
        event_repo::NewEvent {
            id: &event_id,
            club_id: &club_id,
            title: &event.title,
            description: &event.description,
            event_date: &event.event_date,
            event_time: &event.event_time,
            venue: &event.venue,
            activity_point: event.activity_point,
            category: event.category,
            max_participants: event.max_participants,
            form_link: event.form_link.as_deref(),
            deadline: event.deadline.as_deref(),
        },
    )
    .await?;
    club_repo::adjust_counters(
        &mut *tx,
        &club_id,
        CounterDelta {
            total_events: 1,
            pending_verification: 1,
            ..CounterDelta::default()
        },
    )
    .await?;
    tx.commit().await?;

    info!(%event_id, %club_id, created_by = %actor.id, "event created");
    load_view(pool, &event_id).await
}

pub async fn list_events(pool: &SqlitePool, query: ListEventsQuery) -> AppResult<EventPage> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<EventStatus>()
                .map_err(|_| AppError::bad_request(format!("Invalid status '{}'", raw)))?,
        ),
    };
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<Category>().map_err(AppError::bad_request)?),
    };
    let filter = EventFilter {
        status,
        club_id: query
            .club_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        category,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    let total = event_repo::count_events(pool, &filter).await?;
    let pagination = Pagination::new(total, page, limit);
    let rows = event_repo::list_events(pool, &filter, limit, pagination.offset()?).await?;

    Ok(EventPage {
        events: rows.into_iter().map(EventView::from).collect(),
        pagination,
    })
}

pub async fn load_event(pool: &SqlitePool, event_id: &str) -> AppResult<EventView> {
    load_view(pool, event_id).await
}

pub async fn approve_event(
    pool: &SqlitePool,
    actor: Actor<'_>,
    event_id: &str,
) -> AppResult<EventView> {
    access::authorize(actor, Capability::ApproveEvent)?;

    let mut tx = begin_write(pool).await?;
    let Some(event) = event_repo::load_event(&mut *tx, event_id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    if event.status != EventStatus::Pending {
        return Err(AppError::bad_request("Only pending events can be approved"));
    }
    if event_repo::approve_event(&mut *tx, event_id).await? == 0 {
        warn!(%event_id, "event left pending before approval applied");
        return Err(AppError::bad_request("Only pending events can be approved"));
    }
    club_repo::adjust_counters(
        &mut *tx,
        &event.club_id,
        CounterDelta {
            pending_verification: -1,
            upcoming_events: 1,
            ..CounterDelta::default()
        },
    )
    .await?;
    tx.commit().await?;

    info!(%event_id, club_id = %event.club_id, approved_by = %actor.id, "event approved");
    load_view(pool, event_id).await
}

/// Counter adjustment for a status edge. Only `upcoming` is counted once an
/// event has been approved.
fn transition_delta(from: EventStatus, to: EventStatus) -> CounterDelta {
    let mut delta = CounterDelta::default();
    if from == EventStatus::Upcoming {
        delta.upcoming_events -= 1;
    }
    if to == EventStatus::Upcoming {
        delta.upcoming_events += 1;
    }
    delta
}

pub async fn transition_event(
    pool: &SqlitePool,
    actor: Actor<'_>,
    event_id: &str,
    req: StatusChangeRequest,
) -> AppResult<EventView> {
    access::authorize(actor, Capability::TransitionEvent)?;
    let next: EventStatus = req
        .status
        .parse()
        .map_err(|_| AppError::bad_request(format!("Invalid status '{}'", req.status.trim())))?;

    let mut tx = begin_write(pool).await?;
    let Some(event) = event_repo::load_event(&mut *tx, event_id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    access::ensure_club_scope(actor, &event.club_id)?;

    if !event.status.can_transition_to(next) {
        return Err(AppError::bad_request(format!(
            "Cannot change event status from {} to {}",
            event.status, next
        )));
    }
    if event_repo::update_status(&mut *tx, event_id, event.status, next).await? == 0 {
        return Err(AppError::conflict("Event status changed, reload and retry"));
    }

    let delta = transition_delta(event.status, next);
    if delta != CounterDelta::default() {
        club_repo::adjust_counters(&mut *tx, &event.club_id, delta).await?;
    }
    tx.commit().await?;

    info!(%event_id, from = %event.status, to = %next, by = %actor.id, "event status changed");
    load_view(pool, event_id).await
}

pub async fn register_for_event(
    pool: &SqlitePool,
    actor: Actor<'_>,
    event_id: &str,
) -> AppResult<RegistrationOutcome> {
    access::authorize(actor, Capability::RegisterForEvent)?;

    let mut tx = begin_write(pool).await?;
    let Some(event) = event_repo::load_event(&mut *tx, event_id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    if event.status != EventStatus::Upcoming {
        return Err(AppError::bad_request("Event is not open for registration"));
    }
    if let Some(deadline) = event.deadline.as_deref() {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        if today.as_str() > deadline {
            return Err(AppError::bad_request("Registration deadline has passed"));
        }
    }
    if student_repo::load_student(&mut *tx, actor.id).await?.is_none() {
        return Err(AppError::not_found("Student not found"));
    }
    if registration_repo::is_registered(&mut *tx, event_id, actor.id).await? {
        return Err(AppError::bad_request(
            "You are already registered for this event",
        ));
    }
    let registered = registration_repo::count_registrations(&mut *tx, event_id).await?;
    if let Some(max) = event.max_participants {
        if registered >= max {
            return Err(AppError::bad_request(
                "Event has reached maximum participants",
            ));
        }
    }
    registration_repo::insert_registration(&mut *tx, event_id, actor.id).await?;
    tx.commit().await?;

    info!(%event_id, student_id = %actor.id, "student registered for event");
    Ok(RegistrationOutcome {
        event_id: event_id.to_string(),
        registered_count: registered + 1,
    })
}

pub async fn list_registrations(
    pool: &SqlitePool,
    actor: Actor<'_>,
    event_id: &str,
) -> AppResult<RegistrationsView> {
    access::authorize(actor, Capability::ViewRegistrations)?;

    let Some(event) = event_repo::load_event(pool, event_id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    access::ensure_club_scope(actor, &event.club_id)?;

    let registered_students = registration_repo::list_registered_students(pool, event_id).await?;
    let participants_list = participation_repo::list_participants(pool, event_id).await?;

    Ok(RegistrationsView {
        event_id: event.event_id,
        title: event.title,
        max_participants: event.max_participants,
        registered_students,
        participants_list,
    })
}
