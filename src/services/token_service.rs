use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(config: &Config, user_id: &str, email: &str, role: Role) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.token_ttl_hours)).timestamp(),
    };
    encode_claims(config, &claims)
}

fn encode_claims(config: &Config, claims: &Claims) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("token signing failed: {}", e)))
}

pub fn decode_token(config: &Config, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("token rejected: {}", e);
        AppError::unauthorized("Invalid or expired token")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_decode_to_the_same_identity() {
        let config = Config::default();
        let token = issue_token(&config, "c-42", "club@college.edu", Role::Club).unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "c-42");
        assert_eq!(claims.email, "club@college.edu");
        assert_eq!(claims.role, Role::Club);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let config = Config::default();
        let other = Config {
            jwt_secret: "someone-else".to_string(),
            ..Config::default()
        };
        let token = issue_token(&other, "a-1", "a@college.edu", Role::Admin).unwrap();
        assert!(decode_token(&config, &token).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let config = Config::default();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "s-1".to_string(),
            email: "s@college.edu".to_string(),
            role: Role::Student,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode_claims(&config, &claims).unwrap();
        assert!(decode_token(&config, &token).is_err());
    }
}
