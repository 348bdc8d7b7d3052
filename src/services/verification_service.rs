use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::participation_repo::{self, NewParticipation};
use crate::database::{begin_write, event_repo, student_repo};
use crate::error::{AppError, AppResult};
use crate::models::{EventStatus, ParticipationStatus, Role};
use crate::services::access::{self, Actor, Capability};
use crate::services::points_service;

fn default_verified() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct VerifyParticipationRequest {
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default = "default_verified")]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub message: String,
    /// Distinct students in the request.
    pub count: usize,
    /// Students credited with points by this call.
    pub awarded: usize,
    /// Students whose participation was already verified and were skipped.
    pub already_verified: usize,
    /// Students left with a pending record.
    pub pending: usize,
}

fn distinct_ids(students: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    students
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Records participation for a batch of students in one transaction.
///
/// A (event, student) pair is credited at most once: a pending record can be
/// upgraded to verified, a verified record is left untouched.
pub async fn verify_participation(
    pool: &SqlitePool,
    actor: Actor<'_>,
    event_id: &str,
    req: VerifyParticipationRequest,
) -> AppResult<VerificationOutcome> {
    access::authorize(actor, Capability::VerifyParticipation)?;

    let students = distinct_ids(req.students);
    if students.is_empty() {
        return Err(AppError::bad_request("Students array is required"));
    }

    let mut tx = begin_write(pool).await?;
    let Some(event) = event_repo::load_event(&mut *tx, event_id).await? else {
        return Err(AppError::not_found("Event not found"));
    };
    if event.status == EventStatus::Pending {
        return Err(AppError::bad_request(
            "Event must be approved before participation can be verified",
        ));
    }

    let expected = students.len() as i64;
    if student_repo::count_matching(&mut *tx, &students, None).await? != expected {
        return Err(AppError::not_found("One or more students not found"));
    }
    if actor.role == Role::Counsellor
        && student_repo::count_matching(&mut *tx, &students, Some(actor.id)).await? != expected
    {
        return Err(AppError::forbidden(
            "You can only verify your assigned students",
        ));
    }

    let status = if req.verified {
        ParticipationStatus::Verified
    } else {
        ParticipationStatus::Pending
    };

    let mut added = 0i64;
    let mut outcome = VerificationOutcome {
        message: String::new(),
        count: students.len(),
        awarded: 0,
        already_verified: 0,
        pending: 0,
    };

    for student_id in &students {
        match participation_repo::load_entry(&mut *tx, event_id, student_id).await? {
            None => {
                participation_repo::insert_entry(
                    &mut *tx,
                    NewParticipation {
                        event_id,
                        student_id,
                        points: event.activity_point,
                        category: event.category,
                        status,
                        recorded_by: actor.id,
                    },
                )
                .await?;
                added += 1;
                if req.verified {
                    points_service::credit(
                        &mut tx,
                        student_id,
                        event.category,
                        event.activity_point,
                    )
                    .await?;
                    outcome.awarded += 1;
                } else {
                    outcome.pending += 1;
                }
            }
            Some(entry) if entry.status == ParticipationStatus::Verified => {
                outcome.already_verified += 1;
            }
            Some(entry) => {
                if !req.verified {
                    outcome.pending += 1;
                    continue;
                }
                // Credit what was recorded, in case the event changed since.
                if participation_repo::mark_verified(&mut *tx, event_id, student_id, actor.id)
                    .await?
                    == 1
                {
                    points_service::credit(&mut tx, student_id, entry.category, entry.points)
                        .await?;
                    outcome.awarded += 1;
                } else {
                    outcome.already_verified += 1;
                }
            }
        }
    }

    if added > 0 {
        event_repo::add_participants(&mut *tx, event_id, added).await?;
    }
    tx.commit().await?;

    outcome.message = if req.verified {
        "Student participation verified successfully".to_string()
    } else {
        "Student participation recorded as pending".to_string()
    };
    info!(
        %event_id,
        by = %actor.id,
        count = outcome.count,
        awarded = outcome.awarded,
        already_verified = outcome.already_verified,
        pending = outcome.pending,
        "participation verified"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_and_blanks_are_dropped_in_order() {
        let ids = distinct_ids(vec![
            "b".to_string(),
            " a ".to_string(),
            "b".to_string(),
            "".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn verified_defaults_to_true() {
        let req: VerifyParticipationRequest =
            serde_json::from_str(r#"{"students": ["s-1"]}"#).unwrap();
        assert!(req.verified);
    }
}
