use serde::Serialize;

use super::Category;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CertificatesRow {
    pub certificate_id: String,
    pub student_id: String,
    pub title: String,
    pub issuer: String,
    pub issued_on: String,
    pub points: i64,
    pub category: Category,
    pub verified: bool,
    pub added_by: String,
    pub created_at: String,
    pub verified_at: Option<String>,
}
