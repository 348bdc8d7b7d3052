use std::{env, fmt, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "dev-only-activity-points-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub target_points: i64,
    pub secure_cookies: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created on startup when the admins table is empty.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite://activity_points.db".to_string(),
            database_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 12,
            target_points: 100,
            secure_cookies: false,
            bootstrap_admin: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set, signing tokens with the development secret");
                defaults.jwt_secret
            }
        };

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_EMAIL"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together, ignoring");
                None
            }
            (None, None) => None,
        };

        Ok(Self {
            host: try_load("HOST", &defaults.host)?,
            port: try_load("PORT", &defaults.port.to_string())?,
            database_url: try_load("DATABASE_URL", &defaults.database_url)?,
            database_max_connections: try_load(
                "DATABASE_MAX_CONNECTIONS",
                &defaults.database_max_connections.to_string(),
            )?,
            jwt_secret,
            token_ttl_hours: try_load("TOKEN_TTL_HOURS", &defaults.token_ttl_hours.to_string())?,
            target_points: try_load("TARGET_POINTS", &defaults.target_points.to_string())?,
            secure_cookies: try_load("SECURE_COOKIES", &defaults.secure_cookies.to_string())?,
            bootstrap_admin,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }
    })
}
