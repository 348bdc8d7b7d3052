use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::registration_repo::{self, StudentRegistrationRow};
use crate::database::{certificate_repo, participation_repo, student_repo};
use crate::error::{AppError, AppResult};
use crate::models::{Category, CertificatesRow, ParticipationHistoryRow, StudentsRow};
use crate::services::access::{self, Actor};

/// Upper bound on the points a single event or certificate may carry.
pub const MAX_AWARD_POINTS: i64 = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct PointsSummary {
    pub student_id: String,
    pub name: String,
    pub usn: String,
    pub total: i64,
    pub breakdown: BTreeMap<String, i64>,
    pub target: i64,
    pub remaining: i64,
    pub progress_pct: i64,
    pub participation_history: Vec<ParticipationHistoryRow>,
    pub certificates: Vec<CertificatesRow>,
    pub registered_events: Vec<StudentRegistrationRow>,
}

fn progress_pct(total: i64, target: i64) -> i64 {
    if target <= 0 {
        return 100;
    }
    let pct = (total.saturating_mul(100)) / target;
    pct.clamp(0, 100)
}

/// Credits `points` inside the caller's transaction. A credit that would
/// overflow the student's total is refused and the transaction rolls back.
pub(crate) async fn credit(
    conn: &mut SqliteConnection,
    student_id: &str,
    category: Category,
    points: i64,
) -> AppResult<()> {
    if !student_repo::award_points(conn, student_id, category, points).await? {
        return Err(AppError::bad_request(format!(
            "Awarding {} points would exceed the maximum total for student {}",
            points, student_id
        )));
    }
    Ok(())
}

pub async fn load_student(
    pool: &SqlitePool,
    actor: Actor<'_>,
    student_id: &str,
) -> AppResult<StudentsRow> {
    let student = student_repo::load_student(pool, student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;
    access::ensure_student_scope(actor, &student)?;
    Ok(student)
}

pub async fn summary(
    pool: &SqlitePool,
    actor: Actor<'_>,
    student_id: &str,
    target: i64,
) -> AppResult<PointsSummary> {
    let student = load_student(pool, actor, student_id).await?;

    let breakdown: BTreeMap<String, i64> =
        student_repo::load_points_breakdown(pool, &student.student_id)
            .await?
            .into_iter()
            .map(|row| (row.category.as_str().to_string(), row.points))
            .collect();
    let participation_history =
        participation_repo::list_student_history(pool, &student.student_id).await?;
    let certificates = certificate_repo::list_for_student(pool, &student.student_id).await?;
    let registered_events =
        registration_repo::list_student_registrations(pool, &student.student_id).await?;

    let total = student.activity_point;
    Ok(PointsSummary {
        student_id: student.student_id,
        name: student.name,
        usn: student.usn,
        total,
        breakdown,
        target,
        remaining: (target - total).max(0),
        progress_pct: progress_pct(total, target),
        participation_history,
        certificates,
        registered_events,
    })
}
