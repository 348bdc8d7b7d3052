use sqlx::SqliteExecutor;

use crate::models::BranchesRow;

const SQL_LOAD_BRANCH_BY_CODE: &str = r#"
SELECT branch_id, name, code, hod, created_at
FROM branches
WHERE code = ?1
LIMIT 1
"#;

pub async fn load_branch_by_code<'e>(
    executor: impl SqliteExecutor<'e>,
    code: &str,
) -> sqlx::Result<Option<BranchesRow>> {
    sqlx::query_as::<_, BranchesRow>(SQL_LOAD_BRANCH_BY_CODE)
        .bind(code)
        .fetch_optional(executor)
        .await
}

const SQL_LOAD_BRANCH: &str = r#"
SELECT branch_id, name, code, hod, created_at
FROM branches
WHERE branch_id = ?1
LIMIT 1
"#;

pub async fn load_branch<'e>(
    executor: impl SqliteExecutor<'e>,
    branch_id: &str,
) -> sqlx::Result<Option<BranchesRow>> {
    sqlx::query_as::<_, BranchesRow>(SQL_LOAD_BRANCH)
        .bind(branch_id)
        .fetch_optional(executor)
        .await
}

const SQL_INSERT_BRANCH: &str = r#"
INSERT INTO branches (branch_id, name, code, hod)
VALUES (?1, ?2, ?3, ?4)
"#;

pub async fn insert_branch<'e>(
    executor: impl SqliteExecutor<'e>,
    branch_id: &str,
    name: &str,
    code: &str,
    hod: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_BRANCH)
        .bind(branch_id)
        .bind(name)
        .bind(code)
        .bind(hod)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_BRANCHES: &str = r#"
SELECT branch_id, name, code, hod, created_at
FROM branches
ORDER BY code ASC
"#;

pub async fn list_branches<'e>(
    executor: impl SqliteExecutor<'e>,
) -> sqlx::Result<Vec<BranchesRow>> {
    sqlx::query_as::<_, BranchesRow>(SQL_LIST_BRANCHES)
        .fetch_all(executor)
        .await
}
