use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::{branch_repo, club_repo, counsellor_repo, student_repo};
use crate::error::{AppError, AppResult};
use crate::models::{BranchesRow, Category, ClubsRow, CounsellorWithBranchRow, Role, StudentsRow};
use crate::services::access::{self, Actor, Capability};
use crate::services::event_service::page_offset;

const STUDENT_PAGE_LIMIT: i64 = 50;
const MAX_STUDENT_PAGE_LIMIT: i64 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct ClubOption {
    pub id: String,
    pub name: String,
    pub club_type: Category,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchRef {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CounsellorOption {
    pub id: String,
    pub name: String,
    pub email: String,
    pub branch: Option<BranchRef>,
}

impl From<CounsellorWithBranchRow> for CounsellorOption {
    fn from(row: CounsellorWithBranchRow) -> Self {
        let branch = match (row.branch_name, row.branch_code) {
            (Some(name), Some(code)) => Some(BranchRef { name, code }),
            _ => None,
        };
        CounsellorOption {
            id: row.counsellor_id,
            name: row.name,
            email: row.email,
            branch,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct StudentsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_clubs(pool: &SqlitePool) -> AppResult<Vec<ClubOption>> {
    let clubs = club_repo::list_clubs(pool).await?;
    Ok(clubs
        .into_iter()
        .map(|c| ClubOption {
            id: c.club_id,
            name: c.name,
            club_type: c.club_type,
        })
        .collect())
}

pub async fn load_club(pool: &SqlitePool, club_id: &str) -> AppResult<ClubsRow> {
    club_repo::load_club(pool, club_id)
        .await?
        .ok_or_else(|| AppError::not_found("Club not found"))
}

pub async fn list_counsellors(
    pool: &SqlitePool,
    teachers_only: bool,
) -> AppResult<Vec<CounsellorOption>> {
    let rows = counsellor_repo::list_counsellors(pool, teachers_only).await?;
    Ok(rows.into_iter().map(CounsellorOption::from).collect())
}

pub async fn list_branches(pool: &SqlitePool) -> AppResult<Vec<BranchesRow>> {
    Ok(branch_repo::list_branches(pool).await?)
}

/// Admins see every student, counsellors only their advisees.
pub async fn list_students(
    pool: &SqlitePool,
    actor: Actor<'_>,
    query: StudentsQuery,
) -> AppResult<Vec<StudentsRow>> {
    access::authorize(actor, Capability::ListStudents)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(STUDENT_PAGE_LIMIT)
        .clamp(1, MAX_STUDENT_PAGE_LIMIT);
    let counsellor_id = (actor.role == Role::Counsellor).then_some(actor.id);

    let offset = page_offset(page, limit)?;
    Ok(student_repo::list_students(pool, counsellor_id, limit, offset).await?)
}
