use serde::Serialize;

use super::Category;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentsRow {
    pub student_id: String,
    pub email: String,
    pub name: String,
    pub usn: String,
    pub branch_id: String,
    pub counsellor_id: String,
    pub year: i64,
    pub graduation_year: i64,
    pub activity_point: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PointsBreakdownRow {
    pub category: Category,
    pub points: i64,
}

/// Minimal student identity attached to event registrations and participants.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentRefRow {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub usn: String,
}
