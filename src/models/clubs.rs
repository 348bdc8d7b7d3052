use serde::Serialize;

use super::Category;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClubsRow {
    pub club_id: String,
    pub email: String,
    pub name: String,
    pub club_type: Category,
    pub description: String,
    pub faculty_in_charge: Option<String>,
    pub total_events: i64,
    pub pending_verification: i64,
    pub upcoming_events: i64,
    pub created_at: String,
}

/// Stored counters next to the counts derived from the events table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClubCounterAuditRow {
    pub club_id: String,
    pub total_events: i64,
    pub pending_verification: i64,
    pub upcoming_events: i64,
    pub actual_total: i64,
    pub actual_pending: i64,
    pub actual_upcoming: i64,
}

impl ClubCounterAuditRow {
    pub fn is_consistent(&self) -> bool {
        self.total_events == self.actual_total
            && self.pending_verification == self.actual_pending
            && self.upcoming_events == self.actual_upcoming
    }
}
