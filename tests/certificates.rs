mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::spawn_app;

fn certificate(points: i64, verified: bool) -> serde_json::Value {
    json!({
        "title": "Cloud practitioner",
        "issuer": "Cloud Academy",
        "date": "2026-08-14",
        "points": points,
        "category": "technical",
        "verified": verified,
    })
}

#[tokio::test]
async fn verified_certificates_award_points_immediately() {
    let app = spawn_app().await;
    let branch = app.branch("CSE").await;
    let counsellor = app.counsellor(&branch).await;
    let student = app.student(&branch, &counsellor.id).await;
    let uri = format!("/students/{}/certificates", student.id);

    let (status, body) = app.post(&uri, &counsellor.token, certificate(15, true)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["student_points"], 15);
    assert_eq!(body["certificate"]["verified"], true);
    assert_eq!(app.student_points(&student.id).await, (15, 15));

    let (status, body) = app.get(&uri, &student.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["certificates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unverified_certificates_are_credited_on_verification_only_once() {
    let app = spawn_app().await;
    let branch = app.branch("CSE").await;
    let counsellor = app.counsellor(&branch).await;
    let student = app.student(&branch, &counsellor.id).await;
    let admin = app.admin().await;
    let uri = format!("/students/{}/certificates", student.id);

    let (status, body) = app.post(&uri, &admin.token, certificate(12, false)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student_points"], 0);
    let certificate_id = body["certificate"]["certificate_id"]
        .as_str()
        .unwrap()
        .to_string();

    let verify_uri = format!("{}/{}/verify", uri, certificate_id);
    let (status, body) = app.post(&verify_uri, &counsellor.token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_points"], 12);

    let (status, body) = app.post(&verify_uri, &counsellor.token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Certificate is already verified");
    assert_eq!(app.student_points(&student.id).await, (12, 12));

    let (status, _) = app
        .post(&format!("{}/missing/verify", uri), &counsellor.token, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn certificate_access_is_scoped() {
    let app = spawn_app().await;
    let branch = app.branch("CSE").await;
    let counsellor = app.counsellor(&branch).await;
    let other_counsellor = app.counsellor(&branch).await;
    let student = app.student(&branch, &counsellor.id).await;
    let classmate = app.student(&branch, &counsellor.id).await;
    let uri = format!("/students/{}/certificates", student.id);

    let (status, _) = app.post(&uri, &student.token, certificate(5, true)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(&uri, &other_counsellor.token, certificate(5, true))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&uri, &classmate.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post("/students/ghost/certificates", &counsellor.token, certificate(5, true))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn certificate_input_is_validated() {
    let app = spawn_app().await;
    let branch = app.branch("CSE").await;
    let counsellor = app.counsellor(&branch).await;
    let student = app.student(&branch, &counsellor.id).await;
    let uri = format!("/students/{}/certificates", student.id);

    let (status, _) = app.post(&uri, &counsellor.token, certificate(0, true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut untitled = certificate(5, true);
    untitled["title"] = json!("  ");
    let (status, _) = app.post(&uri, &counsellor.token, untitled).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_date = certificate(5, true);
    bad_date["date"] = json!("14-08-2026");
    let (status, _) = app.post(&uri, &counsellor.token, bad_date).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for points in [1001, i64::MAX] {
        let (status, body) = app.post(&uri, &counsellor.token, certificate(points, true)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["message"], "Points must not exceed 1000");
    }

    assert_eq!(app.student_points(&student.id).await, (0, 0));
}

#[tokio::test]
async fn points_summary_combines_events_and_certificates() {
    let app = spawn_app().await;
    let branch = app.branch("CSE").await;
    let counsellor = app.counsellor(&branch).await;
    let student = app.student(&branch, &counsellor.id).await;

    let mut sports = certificate(30, true);
    sports["category"] = json!("sports");
    app.post(
        &format!("/students/{}/certificates", student.id),
        &counsellor.token,
        sports,
    )
    .await;
    app.post(
        &format!("/students/{}/certificates", student.id),
        &counsellor.token,
        certificate(80, true),
    )
    .await;

    let (status, summary) = app
        .get(&format!("/students/{}/points", student.id), &student.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 110);
    assert_eq!(summary["target"], 100);
    assert_eq!(summary["remaining"], 0);
    assert_eq!(summary["progress_pct"], 100);
    assert_eq!(summary["breakdown"]["sports"], 30);
    assert_eq!(summary["certificates"].as_array().unwrap().len(), 2);

    let (status, list) = app.get("/students", &counsellor.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["students"][0]["activity_point"], 110);
    let (status, _) = app.get("/students", &student.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
