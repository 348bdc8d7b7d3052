use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::database::{begin_write, club_repo, student_repo};
use crate::error::AppResult;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReconcileReport {
    pub clubs_checked: u64,
    pub clubs_fixed: u64,
    pub students_checked: u64,
    pub students_fixed: u64,
}

/// Rewrites club counters from the events table and student points from
/// verified participation and certificates, in one transaction.
pub async fn reconcile(pool: &SqlitePool) -> AppResult<ReconcileReport> {
    let mut report = ReconcileReport::default();
    let mut tx = begin_write(pool).await?;

    for club in club_repo::audit_counters(&mut *tx).await? {
        report.clubs_checked += 1;
        if club.is_consistent() {
            continue;
        }
        warn!(
            club_id = %club.club_id,
            stored_total = club.total_events,
            actual_total = club.actual_total,
            stored_pending = club.pending_verification,
            actual_pending = club.actual_pending,
            stored_upcoming = club.upcoming_events,
            actual_upcoming = club.actual_upcoming,
            "club counters drifted"
        );
        club_repo::set_counters(
            &mut *tx,
            &club.club_id,
            club.actual_total,
            club.actual_pending,
            club.actual_upcoming,
        )
        .await?;
        report.clubs_fixed += 1;
    }

    let mut fixed_students: HashSet<String> = HashSet::new();
    for row in student_repo::audit_points(&mut *tx).await? {
        if row.stored == row.earned {
            continue;
        }
        warn!(
            student_id = %row.student_id,
            category = %row.category,
            stored = row.stored,
            earned = row.earned,
            "category points drifted"
        );
        student_repo::set_category_points(&mut *tx, &row.student_id, row.category, row.earned)
            .await?;
        fixed_students.insert(row.student_id);
    }

    // Totals are recomputed after the categories so both agree.
    for row in student_repo::list_totals_audit(&mut *tx).await? {
        report.students_checked += 1;
        if row.activity_point != row.breakdown_sum {
            student_repo::set_total_points(&mut *tx, &row.student_id, row.breakdown_sum).await?;
            fixed_students.insert(row.student_id);
        }
    }
    report.students_fixed = fixed_students.len() as u64;

    tx.commit().await?;
    info!(
        clubs_checked = report.clubs_checked,
        clubs_fixed = report.clubs_fixed,
        students_checked = report.students_checked,
        students_fixed = report.students_fixed,
        "reconcile finished"
    );
    Ok(report)
}
