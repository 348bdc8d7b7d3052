use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::event_service::{
    self, CreateEventRequest, EventPage, ListEventsQuery, RegistrationsView, StatusChangeRequest,
};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn create_event_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<Response> {
    let event = event_service::create_event(&pool, user.actor(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event created successfully", "event": event })),
    )
        .into_response())
}

pub async fn list_events_handler(
    State(pool): State<SqlitePool>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<EventPage>> {
    Ok(Json(event_service::list_events(&pool, query).await?))
}

pub async fn event_detail_handler(
    State(pool): State<SqlitePool>,
    Path(event_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let event = event_service::load_event(&pool, &event_id).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn approve_event_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(event_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let event = event_service::approve_event(&pool, user.actor(), &event_id).await?;
    Ok(Json(json!({ "message": "Event approved successfully", "event": event })))
}

pub async fn event_status_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(event_id): Path<String>,
    Json(req): Json<StatusChangeRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let event = event_service::transition_event(&pool, user.actor(), &event_id, req).await?;
    Ok(Json(json!({ "message": "Event status updated", "event": event })))
}

pub async fn register_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(event_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = event_service::register_for_event(&pool, user.actor(), &event_id).await?;
    Ok(Json(json!({
        "message": "Successfully registered for event",
        "event_id": outcome.event_id,
        "registered_count": outcome.registered_count,
    })))
}

pub async fn registrations_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(event_id): Path<String>,
) -> AppResult<Json<RegistrationsView>> {
    Ok(Json(
        event_service::list_registrations(&pool, user.actor(), &event_id).await?,
    ))
}
