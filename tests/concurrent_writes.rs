mod common;

use std::str::FromStr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use activity_points::database::{self, club_repo};
use activity_points::error::AppError;
use activity_points::models::Category;
use common::spawn_file_app;

#[tokio::test]
async fn racing_approvals_settle_into_one_success() {
    let (app, _) = spawn_file_app().await;
    let club = app.club(Category::Cultural).await;
    let admin = app.admin().await;
    let event_id = app.create_event(&club, 8, None).await;
    let uri = format!("/events/{}/approve", event_id);

    let (first, second) = tokio::join!(
        app.post(&uri, &admin.token, json!({})),
        app.post(&uri, &admin.token, json!({})),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(
        statuses,
        [StatusCode::OK, StatusCode::BAD_REQUEST],
        "{} / {}",
        first.1,
        second.1
    );

    let club = club_repo::load_club(&app.pool, &club.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        (club.total_events, club.pending_verification, club.upcoming_events),
        (1, 0, 1)
    );
}

#[tokio::test]
async fn racing_registrations_respect_capacity() {
    let (app, _) = spawn_file_app().await;
    let branch = app.branch("ECE").await;
    let counsellor = app.counsellor(&branch).await;
    let first_student = app.student(&branch, &counsellor.id).await;
    let second_student = app.student(&branch, &counsellor.id).await;
    let club = app.club(Category::Technical).await;
    let admin = app.admin().await;
    let event_id = app.create_event(&club, 5, Some(1)).await;
    app.approve(&admin, &event_id).await;
    let uri = format!("/events/{}/register", event_id);

    let (first, second) = tokio::join!(
        app.post(&uri, &first_student.token, json!({})),
        app.post(&uri, &second_student.token, json!({})),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let (_, body) = app
        .get(&format!("/events/{}/registrations", event_id), &club.token)
        .await;
    assert_eq!(body["registered_students"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn a_locked_database_is_a_retryable_conflict() {
    let (app, url) = spawn_file_app().await;

    let impatient = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::from_str(&url)
                .unwrap()
                .busy_timeout(Duration::ZERO),
        )
        .await
        .unwrap();

    let held = database::begin_write(&app.pool).await.unwrap();
    let err = database::begin_write(&impatient).await.unwrap_err();
    let err = AppError::from(err);
    assert!(matches!(err, AppError::Conflict(_)), "{:?}", err);
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    drop(held);

    // Plain failures still surface as internal errors.
    assert_eq!(
        AppError::from(sqlx::Error::RowNotFound).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
