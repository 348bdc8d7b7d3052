use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

use crate::models::{Category, CredentialsRow, PointsBreakdownRow, StudentsRow};

const SQL_INSERT_STUDENT: &str = r#"
INSERT INTO students (
  student_id,
  email,
  name,
  password_hash,
  usn,
  branch_id,
  counsellor_id,
  year,
  graduation_year
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

const SQL_SEED_POINTS: &str = r#"
INSERT INTO student_points (student_id, category, points)
VALUES (?1, 'technical', 0), (?1, 'cultural', 0), (?1, 'sports', 0), (?1, 'social', 0)
"#;

pub struct NewStudent<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub usn: &'a str,
    pub branch_id: &'a str,
    pub counsellor_id: &'a str,
    pub year: i64,
    pub graduation_year: i64,
}

/// Inserts the student and seeds a zero points row per category.
pub async fn insert_student(
    conn: &mut SqliteConnection,
    student: NewStudent<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_STUDENT)
        .bind(student.id)
        .bind(student.email)
        .bind(student.name)
        .bind(student.password_hash)
        .bind(student.usn)
        .bind(student.branch_id)
        .bind(student.counsellor_id)
        .bind(student.year)
        .bind(student.graduation_year)
        .execute(&mut *conn)
        .await?;

    sqlx::query(SQL_SEED_POINTS)
        .bind(student.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

const SQL_LOAD_STUDENT: &str = r#"
SELECT
  student_id,
  email,
  name,
  usn,
  branch_id,
  counsellor_id,
  year,
  graduation_year,
  activity_point,
  created_at
FROM students
WHERE student_id = ?1
LIMIT 1
"#;

pub async fn load_student<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
) -> sqlx::Result<Option<StudentsRow>> {
    sqlx::query_as::<_, StudentsRow>(SQL_LOAD_STUDENT)
        .bind(student_id)
        .fetch_optional(executor)
        .await
}

const SQL_LOAD_CREDENTIALS: &str = r#"
SELECT student_id AS id, name, email, password_hash
FROM students
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

const SQL_USN_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM students WHERE usn = ?1)
"#;

pub async fn usn_exists<'e>(executor: impl SqliteExecutor<'e>, usn: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(SQL_USN_EXISTS)
        .bind(usn)
        .fetch_one(executor)
        .await
}

const SQL_LIST_STUDENTS: &str = r#"
SELECT
  student_id,
  email,
  name,
  usn,
  branch_id,
  counsellor_id,
  year,
  graduation_year,
  activity_point,
  created_at
FROM students
WHERE (?1 IS NULL OR counsellor_id = ?1)
ORDER BY usn ASC
LIMIT ?2 OFFSET ?3
"#;

pub async fn list_students<'e>(
    executor: impl SqliteExecutor<'e>,
    counsellor_id: Option<&str>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<StudentsRow>> {
    sqlx::query_as::<_, StudentsRow>(SQL_LIST_STUDENTS)
        .bind(counsellor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

/// Counts how many of `student_ids` exist, optionally restricted to one
/// counsellor's advisees.
pub async fn count_matching<'e>(
    executor: impl SqliteExecutor<'e>,
    student_ids: &[String],
    counsellor_id: Option<&str>,
) -> sqlx::Result<i64> {
    if student_ids.is_empty() {
        return Ok(0);
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM students WHERE student_id IN (");
    let mut ids = qb.separated(", ");
    for id in student_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(")");
    if let Some(counsellor_id) = counsellor_id {
        qb.push(" AND counsellor_id = ").push_bind(counsellor_id);
    }

    qb.build_query_scalar::<i64>().fetch_one(executor).await
}

const SQL_ADD_TOTAL_POINTS: &str = r#"
UPDATE students
SET activity_point = activity_point + ?2
WHERE student_id = ?1
  AND activity_point <= 9223372036854775807 - ?2
"#;

const SQL_STUDENT_EXISTS: &str = r#"
SELECT 1
FROM students
WHERE student_id = ?1
"#;

const SQL_ADD_CATEGORY_POINTS: &str = r#"
UPDATE student_points
SET points = points + ?3
WHERE student_id = ?1
  AND category = ?2
"#;

/// Credits the total and the category counter together. Callers run this
/// inside the transaction that records why the points were earned, so an
/// error here rolls back both counters.
///
/// Returns `Ok(false)` when the credit would overflow the stored total and
/// `RowNotFound` when the student or its category row is missing.
pub async fn award_points(
    conn: &mut SqliteConnection,
    student_id: &str,
    category: Category,
    points: i64,
) -> sqlx::Result<bool> {
    let updated = sqlx::query(SQL_ADD_TOTAL_POINTS)
        .bind(student_id)
        .bind(points)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if updated == 0 {
        let exists = sqlx::query(SQL_STUDENT_EXISTS)
            .bind(student_id)
            .fetch_optional(&mut *conn)
            .await?;
        return match exists {
            Some(_) => Ok(false),
            None => Err(sqlx::Error::RowNotFound),
        };
    }

    let updated = sqlx::query(SQL_ADD_CATEGORY_POINTS)
        .bind(student_id)
        .bind(category)
        .bind(points)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(true)
}

const SQL_LOAD_POINTS_BREAKDOWN: &str = r#"
SELECT category, points
FROM student_points
WHERE student_id = ?1
ORDER BY category ASC
"#;

pub async fn load_points_breakdown<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
) -> sqlx::Result<Vec<PointsBreakdownRow>> {
    sqlx::query_as::<_, PointsBreakdownRow>(SQL_LOAD_POINTS_BREAKDOWN)
        .bind(student_id)
        .fetch_all(executor)
        .await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentTotalsAuditRow {
    pub student_id: String,
    pub activity_point: i64,
    pub breakdown_sum: i64,
}

const SQL_LIST_TOTALS_DRIFT: &str = r#"
SELECT
  s.student_id,
  s.activity_point,
  COALESCE((SELECT SUM(sp.points) FROM student_points sp WHERE sp.student_id = s.student_id), 0)
    AS breakdown_sum
FROM students s
"#;

pub async fn list_totals_audit<'e>(
    executor: impl SqliteExecutor<'e>,
) -> sqlx::Result<Vec<StudentTotalsAuditRow>> {
    sqlx::query_as::<_, StudentTotalsAuditRow>(SQL_LIST_TOTALS_DRIFT)
        .fetch_all(executor)
        .await
}

const SQL_SET_TOTAL_POINTS: &str = r#"
UPDATE students
SET activity_point = ?2
WHERE student_id = ?1
"#;

pub async fn set_total_points<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
    total: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_TOTAL_POINTS)
        .bind(student_id)
        .bind(total)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

/// Stored category points next to what verified participation and
/// certificates actually earned.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PointsAuditRow {
    pub student_id: String,
    pub category: Category,
    pub stored: i64,
    pub earned: i64,
}

const SQL_AUDIT_POINTS: &str = r#"
SELECT
  sp.student_id,
  sp.category,
  sp.points AS stored,
  COALESCE((
    SELECT SUM(p.points)
    FROM participation_history p
    WHERE p.student_id = sp.student_id
      AND p.category = sp.category
      AND p.status = 'verified'
  ), 0)
  + COALESCE((
    SELECT SUM(c.points)
    FROM certificates c
    WHERE c.student_id = sp.student_id
      AND c.category = sp.category
      AND c.verified = 1
  ), 0) AS earned
FROM student_points sp
ORDER BY sp.student_id ASC, sp.category ASC
"#;

pub async fn audit_points<'e>(
    executor: impl SqliteExecutor<'e>,
) -> sqlx::Result<Vec<PointsAuditRow>> {
    sqlx::query_as::<_, PointsAuditRow>(SQL_AUDIT_POINTS)
        .fetch_all(executor)
        .await
}

const SQL_SET_CATEGORY_POINTS: &str = r#"
UPDATE student_points
SET points = ?3
WHERE student_id = ?1
  AND category = ?2
"#;

pub async fn set_category_points<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: &str,
    category: Category,
    points: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_CATEGORY_POINTS)
        .bind(student_id)
        .bind(category)
        .bind(points)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
