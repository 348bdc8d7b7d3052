use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::verification_service::{
    self, VerificationOutcome, VerifyParticipationRequest,
};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn verify_participation_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(event_id): Path<String>,
    Json(req): Json<VerifyParticipationRequest>,
) -> AppResult<Json<VerificationOutcome>> {
    let outcome =
        verification_service::verify_participation(&pool, user.actor(), &event_id, req).await?;
    Ok(Json(outcome))
}
