use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BranchesRow {
    pub branch_id: String,
    pub name: String,
    pub code: String,
    pub hod: String,
    pub created_at: String,
}
