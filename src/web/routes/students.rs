use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::certificate_service::{self, AddCertificateRequest};
use crate::services::directory_service::{self, StudentsQuery};
use crate::services::points_service::{self, PointsSummary};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn list_students_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Query(query): Query<StudentsQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let students = directory_service::list_students(&pool, user.actor(), query).await?;
    Ok(Json(json!({ "students": students })))
}

pub async fn student_detail_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(student_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let student = points_service::load_student(&pool, user.actor(), &student_id).await?;
    Ok(Json(json!({ "student": student })))
}

pub async fn student_points_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Path(student_id): Path<String>,
) -> AppResult<Json<PointsSummary>> {
    let summary =
        points_service::summary(&pool, user.actor(), &student_id, config.target_points).await?;
    Ok(Json(summary))
}

pub async fn list_certificates_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(student_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let certificates =
        certificate_service::list_certificates(&pool, user.actor(), &student_id).await?;
    Ok(Json(json!({ "certificates": certificates })))
}

pub async fn add_certificate_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(student_id): Path<String>,
    Json(req): Json<AddCertificateRequest>,
) -> AppResult<Response> {
    let outcome =
        certificate_service::add_certificate(&pool, user.actor(), &student_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Certificate added successfully",
            "certificate": outcome.certificate,
            "student_points": outcome.student_points,
        })),
    )
        .into_response())
}

pub async fn verify_certificate_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path((student_id, certificate_id)): Path<(String, String)>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = certificate_service::verify_certificate(
        &pool,
        user.actor(),
        &student_id,
        &certificate_id,
    )
    .await?;
    Ok(Json(json!({
        "message": "Certificate verified successfully",
        "certificate": outcome.certificate,
        "student_points": outcome.student_points,
    })))
}
