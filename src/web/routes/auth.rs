use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use cookie::{time::Duration, Cookie, SameSite};
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::auth_service::{self, LoginRequest, RegisterRequest};
use crate::web::middleware::auth::{AuthenticatedUser, ACCESS_TOKEN_COOKIE};

fn session_cookie(value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(max_age);
    cookie
}

fn with_cookie(mut response: Response, cookie: Cookie<'_>) -> AppResult<Response> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::internal(format!("invalid cookie header: {}", e)))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

pub async fn register_handler(
    State(pool): State<SqlitePool>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let user = auth_service::register(&pool, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    )
        .into_response())
}

pub async fn login_handler(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let outcome = auth_service::login(&pool, &config, req).await?;
    let cookie = session_cookie(
        outcome.token.clone(),
        Duration::hours(config.token_ttl_hours),
        config.secure_cookies,
    );
    let response = Json(json!({
        "message": "Login successful",
        "token": outcome.token,
        "user": outcome.user,
        "dashboard_path": outcome.dashboard_path,
    }))
    .into_response();
    with_cookie(response, cookie)
}

pub async fn logout_handler(State(config): State<Arc<Config>>) -> AppResult<Response> {
    let cookie = session_cookie(String::new(), Duration::ZERO, config.secure_cookies);
    let response = Json(json!({ "message": "Logged out successfully" })).into_response();
    with_cookie(response, cookie)
}

pub async fn me_handler(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
    Json(json!({
        "user": {
            "id": user.id,
            "email": user.email,
            "role": user.role,
        }
    }))
}
