#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use activity_points::config::Config;
use activity_points::database::{
    self, admin_repo, branch_repo, club_repo, counsellor_repo, student_repo,
};
use activity_points::models::{Category, Role};
use activity_points::services::token_service;
use activity_points::web::{build_router, AppState};

// Seeded accounts never log in through the API; login tests register first.
const UNUSED_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2VlZGVkc2FsdA$seeded";

pub struct TestApp {
    pub pool: SqlitePool,
    pub config: Config,
    pub router: Router,
}

/// One in-memory database per test. A single connection keeps every query on
/// the same database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with("sqlite::memory:", 1).await
}

/// A throwaway database file behind a multi-connection pool, for tests that
/// need writers racing each other.
pub async fn spawn_file_app() -> (TestApp, String) {
    let path = std::env::temp_dir().join(format!("activity-points-{}.db", Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    (spawn_app_with(&url, 4).await, url)
}

async fn spawn_app_with(database_url: &str, max_connections: u32) -> TestApp {
    let pool = database::connect(database_url, max_connections)
        .await
        .unwrap();
    database::migrate(&pool).await.unwrap();

    let config = Config {
        jwt_secret: "test-secret".to_string(),
        target_points: 100,
        ..Config::default()
    };
    let router = build_router(AppState::new(pool.clone(), config.clone()));
    TestApp {
        pool,
        config,
        router,
    }
}

pub struct Account {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    fn token_for(&self, id: &str, email: &str, role: Role) -> String {
        token_service::issue_token(&self.config, id, email, role).unwrap()
    }

    pub async fn branch(&self, code: &str) -> String {
        let id = Uuid::new_v4().to_string();
        branch_repo::insert_branch(&self.pool, &id, code, code, "TBD")
            .await
            .unwrap();
        id
    }

    pub async fn admin(&self) -> Account {
        self.admin_with_role(Role::Admin).await
    }

    pub async fn admin_with_role(&self, role: Role) -> Account {
        let id = Uuid::new_v4().to_string();
        let email = format!("{}@admin.test", &id[..8]);
        admin_repo::insert_admin(
            &self.pool,
            admin_repo::NewAdmin {
                id: &id,
                email: &email,
                name: "Admin",
                password_hash: UNUSED_HASH,
                role,
            },
        )
        .await
        .unwrap();
        let token = self.token_for(&id, &email, role);
        Account { id, email, token }
    }

    pub async fn counsellor(&self, branch_id: &str) -> Account {
        let id = Uuid::new_v4().to_string();
        let email = format!("{}@staff.test", &id[..8]);
        counsellor_repo::insert_counsellor(
            &self.pool,
            counsellor_repo::NewCounsellor {
                id: &id,
                email: &email,
                name: "Counsellor",
                password_hash: UNUSED_HASH,
                branch_id,
                is_club_counsellor: false,
            },
        )
        .await
        .unwrap();
        let token = self.token_for(&id, &email, Role::Counsellor);
        Account { id, email, token }
    }

    pub async fn student(&self, branch_id: &str, counsellor_id: &str) -> Account {
        let id = Uuid::new_v4().to_string();
        let email = format!("{}@student.test", &id[..8]);
        let usn = format!("USN{}", &id[..8]).to_uppercase();
        let mut conn = self.pool.acquire().await.unwrap();
        student_repo::insert_student(
            &mut conn,
            student_repo::NewStudent {
                id: &id,
                email: &email,
                name: "Student",
                password_hash: UNUSED_HASH,
                usn: &usn,
                branch_id,
                counsellor_id,
                year: 2,
                graduation_year: 2028,
            },
        )
        .await
        .unwrap();
        let token = self.token_for(&id, &email, Role::Student);
        Account { id, email, token }
    }

    pub async fn club(&self, club_type: Category) -> Account {
        let id = Uuid::new_v4().to_string();
        let email = format!("{}@club.test", &id[..8]);
        club_repo::insert_club(
            &self.pool,
            club_repo::NewClub {
                id: &id,
                email: &email,
                name: &format!("Club {}", &id[..4]),
                password_hash: UNUSED_HASH,
                club_type,
                description: "",
                faculty_in_charge: None,
            },
        )
        .await
        .unwrap();
        let token = self.token_for(&id, &email, Role::Club);
        Account { id, email, token }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Creates an event as `club` and returns its id.
    pub async fn create_event(&self, club: &Account, points: i64, max: Option<i64>) -> String {
        let (status, body) = self
            .post(
                "/events",
                &club.token,
                serde_json::json!({
                    "title": "Robotics workshop",
                    "description": "Build a line follower",
                    "date": "2026-11-20",
                    "time": "10:00",
                    "venue": "Lab 3",
                    "points": points,
                    "category": "technical",
                    "maxParticipants": max,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["event"]["event_id"].as_str().unwrap().to_string()
    }

    pub async fn approve(&self, admin: &Account, event_id: &str) {
        let (status, body) = self
            .post(
                &format!("/events/{}/approve", event_id),
                &admin.token,
                serde_json::json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    pub async fn student_points(&self, student_id: &str) -> (i64, i64) {
        let total: i64 =
            sqlx::query_scalar("SELECT activity_point FROM students WHERE student_id = ?1")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await
                .unwrap();
        let breakdown: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0) FROM student_points WHERE student_id = ?1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        (total, breakdown)
    }
}
