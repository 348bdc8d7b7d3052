use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Upcoming,
    Ongoing,
    Completed,
    Verified,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Verified => "verified",
        }
    }

    /// Lifecycle edges reachable through the status endpoint.
    /// `Pending -> Upcoming` is approval and has its own operation.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Upcoming, EventStatus::Ongoing)
                | (EventStatus::Upcoming, EventStatus::Completed)
                | (EventStatus::Ongoing, EventStatus::Completed)
                | (EventStatus::Completed, EventStatus::Verified)
        )
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "verified" => Ok(EventStatus::Verified),
            other => Err(format!("unknown event status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventsRow {
    pub event_id: String,
    pub club_id: String,
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub event_time: String,
    pub venue: String,
    pub activity_point: i64,
    pub category: Category,
    pub max_participants: Option<i64>,
    pub status: EventStatus,
    pub verified: bool,
    pub participants: i64,
    pub form_link: Option<String>,
    pub deadline: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Event joined with its club, as shown in listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventListingRow {
    #[sqlx(flatten)]
    pub event: EventsRow,
    pub club_name: String,
    pub club_email: String,
    pub registered_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        use EventStatus::*;
        assert!(Upcoming.can_transition_to(Ongoing));
        assert!(Upcoming.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Verified));

        assert!(!Pending.can_transition_to(Upcoming));
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Verified.can_transition_to(Pending));
        assert!(!Ongoing.can_transition_to(Ongoing));
    }

    #[test]
    fn round_trips_through_str() {
        for s in ["pending", "upcoming", "ongoing", "completed", "verified"] {
            assert_eq!(s.parse::<EventStatus>().unwrap().as_str(), s);
        }
    }
}
