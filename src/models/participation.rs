use serde::{Deserialize, Serialize};

use super::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ParticipationStatus {
    Pending,
    Verified,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipationRow {
    pub event_id: String,
    pub student_id: String,
    pub points: i64,
    pub category: Category,
    pub status: ParticipationStatus,
    pub recorded_by: String,
    pub recorded_at: String,
    pub verified_at: Option<String>,
}

/// A student's participation history entry with the event title resolved.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ParticipationHistoryRow {
    pub event_id: String,
    pub event_title: String,
    pub event_date: String,
    pub points: i64,
    pub category: Category,
    pub status: ParticipationStatus,
    pub recorded_at: String,
    pub verified_at: Option<String>,
}
