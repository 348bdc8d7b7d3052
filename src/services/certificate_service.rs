use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{begin_write, certificate_repo, student_repo};
use crate::error::{AppError, AppResult};
use crate::models::{Category, CertificatesRow, StudentsRow};
use crate::services::access::{self, Actor, Capability};
use crate::services::points_service::{self, MAX_AWARD_POINTS};

fn default_verified() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AddCertificateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default, alias = "date")]
    pub issued_on: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_verified")]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateOutcome {
    pub certificate: CertificatesRow,
    pub student_points: i64,
}

async fn load_scoped_student(
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

pub async fn add_certificate(
    pool: &SqlitePool,
    actor: Actor<'_>,
    student_id: &str,
    req: AddCertificateRequest,
) -> AppResult<CertificateOutcome> {
    access::authorize(actor, Capability::ManageCertificates)?;

    let title = req.title.trim();
    let issuer = req.issuer.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Certificate title is required"));
    }
    if issuer.is_empty() {
        return Err(AppError::bad_request("Certificate issuer is required"));
    }
    if req.points <= 0 {
        return Err(AppError::bad_request("Points must be greater than 0"));
    }
    if req.points > MAX_AWARD_POINTS {
        return Err(AppError::bad_request(format!(
            "Points must not exceed {}",
            MAX_AWARD_POINTS
        )));
    }
    let category: Category = req.category.parse().map_err(AppError::bad_request)?;
    let issued_on = NaiveDate::parse_from_str(req.issued_on.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("Invalid certificate date, expected YYYY-MM-DD"))?
        .format("%Y-%m-%d")
        .to_string();

    let student = load_scoped_student(pool, actor, student_id).await?;

    let certificate_id = Uuid::new_v4().to_string();
    let mut tx = begin_write(pool).await?;
    certificate_repo::insert_certificate(
        &mut *tx,
        certificate_repo::NewCertificate {
            id: &certificate_id,
            student_id: &student.student_id,
            title,
            issuer,
            issued_on: &issued_on,
            points: req.points,
            category,
            verified: req.verified,
            added_by: actor.id,
        },
    )
    .await?;
    if req.verified {
        points_service::credit(&mut tx, &student.student_id, category, req.points).await?;
    }
    tx.commit().await?;

    info!(
        %certificate_id,
        student_id = %student.student_id,
        verified = req.verified,
        by = %actor.id,
        "certificate added"
    );
    outcome(pool, &student.student_id, &certificate_id).await
}

pub async fn verify_certificate(
    pool: &SqlitePool,
    actor: Actor<'_>,
    student_id: &str,
    certificate_id: &str,
) -> AppResult<CertificateOutcome> {
    access::authorize(actor, Capability::ManageCertificates)?;
    let student = load_scoped_student(pool, actor, student_id).await?;

    let mut tx = begin_write(pool).await?;
    let Some(cert) =
        certificate_repo::load_certificate(&mut *tx, &student.student_id, certificate_id).await?
    else {
        return Err(AppError::not_found("Certificate not found"));
    };
    if cert.verified || certificate_repo::mark_verified(&mut *tx, certificate_id).await? == 0 {
        return Err(AppError::bad_request("Certificate is already verified"));
    }
    points_service::credit(&mut tx, &student.student_id, cert.category, cert.points).await?;
    tx.commit().await?;

    info!(%certificate_id, student_id = %student.student_id, by = %actor.id, "certificate verified");
    outcome(pool, &student.student_id, certificate_id).await
}

async fn outcome(
    pool: &SqlitePool,
    student_id: &str,
    certificate_id: &str,
) -> AppResult<CertificateOutcome> {
    let certificate = certificate_repo::load_certificate(pool, student_id, certificate_id)
        .await?
        .ok_or_else(|| AppError::internal("certificate vanished after write"))?;
    let student_points = student_repo::load_student(pool, student_id)
        .await?
        .map(|s| s.activity_point)
        .unwrap_or_default();
    Ok(CertificateOutcome {
        certificate,
        student_points,
    })
}

/// Students may read their own certificates; counsellors and admins read
/// within their scope.
pub async fn list_certificates(
    pool: &SqlitePool,
    actor: Actor<'_>,
    student_id: &str,
) -> AppResult<Vec<CertificatesRow>> {
    let student = load_scoped_student(pool, actor, student_id).await?;
    Ok(certificate_repo::list_for_student(pool, &student.student_id).await?)
}
