use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::Cookie;
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::models::Role;
use crate::services::access::Actor;
use crate::services::token_service;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor<'_> {
        Actor {
            id: &self.id,
            role: self.role,
        }
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves the caller from a bearer token or the session cookie and
/// injects [`AuthenticatedUser`] into the request extensions.
pub async fn require_auth(
    State(config): State<Arc<Config>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(t) => Some(t.to_string()),
        None => cookie_token(&request),
    };
    let Some(token) = token else {
        return AppError::unauthorized("Authentication required").into_response();
    };

    match token_service::decode_token(&config, &token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthenticatedUser {
                id: claims.sub,
                email: claims.email,
                role: claims.role,
            });
            next.run(request).await
        }
        Err(e) => {
            debug!(path = %request.uri().path(), "rejected token");
            e.into_response()
        }
    }
}
