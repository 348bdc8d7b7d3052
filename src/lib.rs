//! Activity points portal: students collect points for verified event
//! participation and certificates, clubs publish events, counsellors and
//! admins verify and approve.
//!
//! Layering follows the request path: `web` (routes + auth middleware) calls
//! `services`, which call the SQL in `database` and map `models` rows.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod web;
