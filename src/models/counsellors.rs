use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CounsellorsRow {
    pub counsellor_id: String,
    pub email: String,
    pub name: String,
    pub branch_id: String,
    pub is_club_counsellor: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CounsellorWithBranchRow {
    pub counsellor_id: String,
    pub name: String,
    pub email: String,
    pub branch_name: Option<String>,
    pub branch_code: Option<String>,
}
