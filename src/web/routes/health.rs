use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;

const BUILD_ID: &str = env!("ACTIVITY_POINTS_BUILD_ID");

pub async fn health_handler(State(pool): State<SqlitePool>) -> impl IntoResponse {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok", "build": BUILD_ID })),
        ),
        Err(e) => {
            error!("health check database ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unreachable", "build": BUILD_ID })),
            )
        }
    }
}
