use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::services::directory_service;

pub async fn clubs_handler(State(pool): State<SqlitePool>) -> AppResult<Json<serde_json::Value>> {
    let clubs = directory_service::list_clubs(&pool).await?;
    Ok(Json(json!({ "clubs": clubs })))
}

pub async fn club_detail_handler(
    State(pool): State<SqlitePool>,
    Path(club_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let club = directory_service::load_club(&pool, &club_id).await?;
    Ok(Json(json!({ "club": club })))
}

pub async fn counsellors_handler(
    State(pool): State<SqlitePool>,
) -> AppResult<Json<serde_json::Value>> {
    let counsellors = directory_service::list_counsellors(&pool, false).await?;
    Ok(Json(json!({ "counsellors": counsellors })))
}

pub async fn teachers_handler(
    State(pool): State<SqlitePool>,
) -> AppResult<Json<serde_json::Value>> {
    let teachers = directory_service::list_counsellors(&pool, true).await?;
    Ok(Json(json!({ "teachers": teachers })))
}

pub async fn branches_handler(
    State(pool): State<SqlitePool>,
) -> AppResult<Json<serde_json::Value>> {
    let branches = directory_service::list_branches(&pool).await?;
    Ok(Json(json!({ "branches": branches })))
}
