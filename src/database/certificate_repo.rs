use sqlx::SqliteExecutor;

use crate::models::{Category, CertificatesRow};

const SQL_INSERT_CERTIFICATE: &str = r#"
INSERT INTO certificates (
  certificate_id,
  student_id,
  title,
  issuer,
  issued_on,
  points,
  category,
  verified,
  added_by,
  verified_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, CASE WHEN ?8 = 1 THEN datetime('now') END)
"#;

pub struct NewCertificate<'a> {
    pub id: &'a str,
    pub student_id: &'a str,
    pub title: &'a str,
    pub issuer: &'a str,
    pub issued_on: &'a str,
    pub points: i64,
    pub category: Category,
    pub verified: bool,
    pub added_by: &'a str,
}

pub async fn insert_certificate<'e>(
    executor: impl SqliteExecutor<'e>,
    cert: NewCertificate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_CERTIFICATE)
        .bind(cert.id)
        .bind(cert.student_id)
        .bind(cert.title)
        .bind(cert.issuer)
        .bind(cert.issued_on)
        .bind(cert.points)
        .bind(cert.category)
        .bind(cert.verified)
        .bind(cert.added_by)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_CERTIFICATE: &str = r#"
SELECT
  certificate_id,
  student_id,
  title,
  issuer,
  issued_on,
  points,
  category,
  verified,
  added_by,
  created_at,
  verified_at
FROM certificates
WHERE certificate_id = ?1
  AND student_id = ?2
LIMIT 1
"#;

pub async fn load_certificate<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
    certificate_id: &str,
) -> sqlx::Result<Option<CertificatesRow>> {
    sqlx::query_as::<_, CertificatesRow>(SQL_LOAD_CERTIFICATE)
        .bind(certificate_id)
        .bind(student_id)
        .fetch_optional(executor)
        .await
}

const SQL_MARK_VERIFIED: &str = r#"
UPDATE certificates
SET verified = 1,
    verified_at = datetime('now')
WHERE certificate_id = ?1
  AND verified = 0
"#;

pub async fn mark_verified<'e>(
    executor: impl SqliteExecutor<'e>,
    certificate_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_VERIFIED)
        .bind(certificate_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_FOR_STUDENT: &str = r#"
SELECT
  certificate_id,
  student_id,
  title,
  issuer,
  issued_on,
  points,
  category,
  verified,
  added_by,
  created_at,
  verified_at
FROM certificates
WHERE student_id = ?1
ORDER BY issued_on DESC, created_at DESC
"#;

pub async fn list_for_student<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
) -> sqlx::Result<Vec<CertificatesRow>> {
    sqlx::query_as::<_, CertificatesRow>(SQL_LIST_FOR_STUDENT)
        .bind(student_id)
        .fetch_all(executor)
        .await
}
