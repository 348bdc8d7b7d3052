mod common;

use axum::http::StatusCode;
use serde_json::json;

use activity_points::database::club_repo;
use activity_points::models::{Category, Role};
use common::spawn_app;

async fn counters(app: &common::TestApp, club_id: &str) -> (i64, i64, i64) {
    let club = club_repo::load_club(&app.pool, club_id)
        .await
        .unwrap()
        .unwrap();
    (
        club.total_events,
        club.pending_verification,
        club.upcoming_events,
    )
}

#[tokio::test]
async fn creating_an_event_bumps_club_counters() {
    let app = spawn_app().await;
    let club = app.club(Category::Technical).await;

    let event_id = app.create_event(&club, 10, None).await;
    let (status, body) = app.get(&format!("/events/{}", event_id), &club.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["status"], "pending");
    assert_eq!(body["event"]["verified"], false);
    assert_eq!(body["event"]["club"]["id"], club.id.as_str());

    assert_eq!(counters(&app, &club.id).await, (1, 1, 0));
}

#[tokio::test]
async fn event_creation_validates_input() {
    let app = spawn_app().await;
    let club = app.club(Category::Sports).await;
    let admin = app.admin().await;

    let (status, _) = app
        .post("/events", &club.token, json!({ "title": "Only a title" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/events",
            &club.token,
            json!({
                "title": "Relay", "description": "4x100", "date": "2026-11-20",
                "time": "07:00", "venue": "Track", "points": 5, "category": "chess"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("technical"));

    // Admins must say which club the event belongs to.
    let event = json!({
        "title": "Relay", "description": "4x100", "date": "2026-11-20",
        "time": "07:00", "venue": "Track", "points": 5, "category": "sports"
    });
    let (status, _) = app.post("/events", &admin.token, event.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut with_unknown_club = event.clone();
    with_unknown_club["club"] = json!("no-such-club");
    let (status, _) = app.post("/events", &admin.token, with_unknown_club).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut with_club = event;
    with_club["club"] = json!(club.id);
    let (status, _) = app.post("/events", &admin.token, with_club).await;
    assert_eq!(status, StatusCode::CREATED);

    let branch = app.branch("CSE").await;
    let counsellor = app.counsellor(&branch).await;
    let student = app.student(&branch, &counsellor.id).await;
    let (status, _) = app
        .post(
            "/events",
            &student.token,
            json!({ "title": "x", "description": "x", "date": "2026-11-20",
                    "time": "07:00", "venue": "x", "points": 1, "category": "social" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn approval_is_admin_only_and_happens_once() {
    let app = spawn_app().await;
    let club = app.club(Category::Cultural).await;
    let admin = app.admin().await;
    let event_id = app.create_event(&club, 8, None).await;
    let approve_uri = format!("/events/{}/approve", event_id);

    let (status, _) = app.post(&approve_uri, &club.token, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&approve_uri, &admin.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["status"], "upcoming");
    assert_eq!(body["event"]["verified"], true);
    assert_eq!(counters(&app, &club.id).await, (1, 0, 1));

    let (status, body) = app.post(&approve_uri, &admin.token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only pending events can be approved");
    assert_eq!(counters(&app, &club.id).await, (1, 0, 1));

    let (status, _) = app
        .post("/events/missing/approve", &admin.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deans_can_approve() {
    let app = spawn_app().await;
    let club = app.club(Category::Social).await;
    let dean = app.admin_with_role(Role::Dean).await;
    let event_id = app.create_event(&club, 3, None).await;
    app.approve(&dean, &event_id).await;
}

#[tokio::test]
async fn status_transitions_follow_the_lifecycle() {
    let app = spawn_app().await;
    let club = app.club(Category::Technical).await;
    let other_club = app.club(Category::Technical).await;
    let admin = app.admin().await;
    let event_id = app.create_event(&club, 10, None).await;
    let status_uri = format!("/events/{}/status", event_id);

    // Pending events only move through approval.
    let (status, _) = app
        .post(&status_uri, &club.token, json!({ "status": "upcoming" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.approve(&admin, &event_id).await;

    let (status, _) = app
        .post(&status_uri, &other_club.token, json!({ "status": "ongoing" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&status_uri, &club.token, json!({ "status": "ongoing" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["event"]["status"], "ongoing");
    assert_eq!(counters(&app, &club.id).await, (1, 0, 0));

    let (status, _) = app
        .post(&status_uri, &club.token, json!({ "status": "upcoming" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&status_uri, &admin.token, json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .post(&status_uri, &admin.token, json!({ "status": "verified" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["status"], "verified");

    let (status, _) = app
        .post(&status_uri, &admin.token, json!({ "status": "archived" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_filters_and_paginates() {
    let app = spawn_app().await;
    let club = app.club(Category::Technical).await;
    let admin = app.admin().await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(app.create_event(&club, 5, None).await);
    }
    app.approve(&admin, &ids[0]).await;

    let (status, body) = app.get("/events?limit=2&page=1", &club.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);

    let (_, body) = app.get("/events?limit=2&page=2", &club.token).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/events?status=upcoming", &club.token).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event_id"], ids[0].as_str());

    let (_, body) = app
        .get(&format!("/events?club={}&category=Technical", club.id), &club.token)
        .await;
    assert_eq!(body["pagination"]["total"], 3);

    let (_, body) = app.get("/events?category=sports", &club.token).await;
    assert_eq!(body["pagination"]["total"], 0);

    let (status, _) = app.get("/events?status=archived", &club.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Limits are clamped rather than rejected.
    let (_, body) = app.get("/events?limit=1000", &club.token).await;
    assert_eq!(body["pagination"]["limit"], 100);
}

#[tokio::test]
async fn pages_past_the_addressable_range_are_rejected() {
    let app = spawn_app().await;
    let club = app.club(Category::Technical).await;
    let admin = app.admin().await;
    app.create_event(&club, 5, None).await;

    let (status, body) = app
        .get("/events?page=9223372036854775807&limit=100", &club.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Page number is too large");

    let (status, body) = app
        .get("/students?page=9223372036854775807&limit=500", &admin.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Page number is too large");

    // Far but addressable pages are simply empty.
    let (status, body) = app.get("/events?page=1000000&limit=100", &club.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn event_points_are_capped() {
    let app = spawn_app().await;
    let club = app.club(Category::Technical).await;

    for points in [1001, i64::MAX] {
        let (status, body) = app
            .post(
                "/events",
                &club.token,
                json!({
                    "title": "Marathon",
                    "description": "Campus run",
                    "date": "2026-11-20",
                    "time": "06:00",
                    "venue": "Track",
                    "points": points,
                    "category": "technical",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["message"], "Points must not exceed 1000");
    }
    assert_eq!(counters(&app, &club.id).await, (0, 0, 0));

    app.create_event(&club, 1000, None).await;
    assert_eq!(counters(&app, &club.id).await, (1, 1, 0));
}
