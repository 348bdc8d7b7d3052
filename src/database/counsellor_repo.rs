use sqlx::SqliteExecutor;

use crate::models::{CounsellorWithBranchRow, CounsellorsRow, CredentialsRow};

const SQL_INSERT_COUNSELLOR: &str = r#"
INSERT INTO counsellors (counsellor_id, email, name, password_hash, branch_id, is_club_counsellor)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub struct NewCounsellor<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub branch_id: &'a str,
    pub is_club_counsellor: bool,
}

pub async fn insert_counsellor<'e>(
    executor: impl SqliteExecutor<'e>,
    counsellor: NewCounsellor<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_COUNSELLOR)
        .bind(counsellor.id)
        .bind(counsellor.email)
        .bind(counsellor.name)
        .bind(counsellor.password_hash)
        .bind(counsellor.branch_id)
        .bind(counsellor.is_club_counsellor)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_COUNSELLOR: &str = r#"
SELECT counsellor_id, email, name, branch_id, is_club_counsellor, created_at
FROM counsellors
WHERE counsellor_id = ?1
LIMIT 1
"#;

pub async fn load_counsellor<'e>(
    executor: impl SqliteExecutor<'e>,
    counsellor_id: &str,
) -> sqlx::Result<Option<CounsellorsRow>> {
    sqlx::query_as::<_, CounsellorsRow>(SQL_LOAD_COUNSELLOR)
        .bind(counsellor_id)
        .fetch_optional(executor)
        .await
}

const SQL_LOAD_CREDENTIALS: &str = r#"
SELECT counsellor_id AS id, name, email, password_hash
FROM counsellors
WHERE email = ?1
LIMIT 1
"#;

pub async fn load_credentials<'e>(
    executor: impl SqliteExecutor<'e>,
    email: &str,
) -> sqlx::Result<Option<CredentialsRow>> {
    sqlx::query_as::<_, CredentialsRow>(SQL_LOAD_CREDENTIALS)
        .bind(email)
        .fetch_optional(executor)
        .await
}

// Teachers are the counsellors who do not run a club.
const SQL_LIST_COUNSELLORS: &str = r#"
SELECT
  c.counsellor_id,
  c.name,
  c.email,
  b.name AS branch_name,
  b.code AS branch_code
FROM counsellors c
LEFT JOIN branches b ON b.branch_id = c.branch_id
WHERE (?1 = 0 OR c.is_club_counsellor = 0)
ORDER BY c.name ASC
"#;

pub async fn list_counsellors<'e>(
    executor: impl SqliteExecutor<'e>,
    teachers_only: bool,
) -> sqlx::Result<Vec<CounsellorWithBranchRow>> {
    sqlx::query_as::<_, CounsellorWithBranchRow>(SQL_LIST_COUNSELLORS)
        .bind(teachers_only)
        .fetch_all(executor)
        .await
}
