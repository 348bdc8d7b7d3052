use sqlx::SqliteExecutor;

use crate::models::{CredentialsRow, Role};

const SQL_INSERT_ADMIN: &str = r#"
INSERT INTO admins (admin_id, email, name, password_hash, role)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub struct NewAdmin<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: Role, // admin|dean
}

pub async fn insert_admin<'e>(
    executor: impl SqliteExecutor<'e>,
    admin: NewAdmin<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ADMIN)
        .bind(admin.id)
        .bind(admin.email)
        .bind(admin.name)
        .bind(admin.password_hash)
        .bind(admin.role)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_CREDENTIALS: &str = r#"
SELECT admin_id AS id, name, email, password_hash
FROM admins
WHERE email = ?1
  AND role = ?2
LIMIT 1
"#;

pub async fn load_credentials<'e>(
    executor: impl SqliteExecutor<'e>,
    email: &str,
    role: Role,
) -> sqlx::Result<Option<CredentialsRow>> {
    sqlx::query_as::<_, CredentialsRow>(SQL_LOAD_CREDENTIALS)
        .bind(email)
        .bind(role)
        .fetch_optional(executor)
        .await
}

const SQL_COUNT_ADMINS: &str = r#"
SELECT COUNT(*) FROM admins WHERE role = 'admin'
"#;

pub async fn count_admins<'e>(executor: impl SqliteExecutor<'e>) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_ADMINS)
        .fetch_one(executor)
        .await
}
