use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::access::{self, Capability};
use crate::services::auth_service::{self, NewBranchRequest, NewCounsellorRequest};
use crate::services::reconcile_service::{self, ReconcileReport};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn create_counsellor_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(req): Json<NewCounsellorRequest>,
) -> AppResult<Response> {
    let counsellor = auth_service::create_counsellor(&pool, user.actor(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Counsellor created successfully", "counsellor": counsellor })),
    )
        .into_response())
}

pub async fn create_branch_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(req): Json<NewBranchRequest>,
) -> AppResult<Response> {
    let branch = auth_service::create_branch(&pool, user.actor(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Branch created successfully", "branch": branch })),
    )
        .into_response())
}

pub async fn reconcile_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> AppResult<Json<ReconcileReport>> {
    access::authorize(user.actor(), Capability::Reconcile)?;
    Ok(Json(reconcile_service::reconcile(&pool).await?))
}
