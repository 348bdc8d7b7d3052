use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{BootstrapAdmin, Config};
use crate::database::{
    admin_repo, begin_write, branch_repo, club_repo, counsellor_repo, student_repo,
};
use crate::error::{AppError, AppResult};
use crate::models::{BranchesRow, Category, CounsellorsRow, CredentialsRow, Role};
use crate::services::access::{self, Actor, Capability};
use crate::services::token_service;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    // student
    pub usn: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i64>,
    #[serde(alias = "graduationYear")]
    pub graduation_year: Option<i64>,
    #[serde(alias = "selectedCounsellor")]
    pub counsellor_id: Option<String>,
    // club
    #[serde(alias = "clubName")]
    pub club_name: Option<String>,
    #[serde(alias = "clubType")]
    pub club_type: Option<String>,
    pub description: Option<String>,
    pub faculty_in_charge: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: SessionUser,
    pub dashboard_path: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct NewCounsellorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "branchId")]
    pub branch_id: String,
    #[serde(default)]
    pub is_club_counsellor: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct NewBranchRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub hod: Option<String>,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// Hashing runs on the blocking pool.
async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("hashing task failed: {}", e)))?
}

async fn verify_password_blocking(hash: String, password: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| AppError::internal(format!("verification task failed: {}", e)))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

async fn load_credentials(
    pool: &SqlitePool,
    role: Role,
    email: &str,
) -> sqlx::Result<Option<CredentialsRow>> {
    match role {
        Role::Student => student_repo::load_credentials(pool, email).await,
        Role::Club => club_repo::load_credentials(pool, email).await,
        Role::Counsellor => counsellor_repo::load_credentials(pool, email).await,
        Role::Admin | Role::Dean => admin_repo::load_credentials(pool, email, role).await,
    }
}

pub async fn register(pool: &SqlitePool, req: RegisterRequest) -> AppResult<SessionUser> {
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();
    if email.is_empty() || req.password.is_empty() || name.is_empty() || req.role.trim().is_empty()
    {
        return Err(AppError::bad_request(
            "Email, password, name, and role are required",
        ));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Password must be at least 6 characters long",
        ));
    }

    let role: Role = req.role.parse().map_err(|_| {
        AppError::bad_request("Invalid role. Only student and club registration is allowed.")
    })?;
    if !matches!(role, Role::Student | Role::Club) {
        warn!(%email, %role, "self registration refused for staff role");
        return Err(AppError::forbidden(
            "This type of account cannot be registered through this endpoint.",
        ));
    }

    if load_credentials(pool, role, &email).await?.is_some() {
        return Err(AppError::conflict("User with this email already exists"));
    }

    let id = Uuid::new_v4().to_string();
    let user = match role {
        Role::Student => register_student(pool, &id, &email, &name, &req).await?,
        _ => register_club(pool, &id, &email, &req).await?,
    };

    info!(user_id = %user.id, role = %user.role, "account registered");
    Ok(user)
}

async fn register_student(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    name: &str,
    req: &RegisterRequest,
) -> AppResult<SessionUser> {
    let (Some(usn), Some(branch_code), Some(year), Some(graduation_year), Some(counsellor_id)) = (
        non_empty(req.usn.as_deref()),
        non_empty(req.branch.as_deref()),
        req.year,
        req.graduation_year,
        non_empty(req.counsellor_id.as_deref()),
    ) else {
        return Err(AppError::bad_request(
            "USN, branch, year, graduation year, and counsellor are required for student registration",
        ));
    };
    if !(1..=6).contains(&year) || graduation_year < 1900 {
        return Err(AppError::bad_request("Invalid year or graduation year"));
    }

    let usn = usn.to_uppercase();
    let branch_code = branch_code.to_uppercase();

    if student_repo::usn_exists(pool, &usn).await? {
        return Err(AppError::conflict("A student with this USN already exists"));
    }
    if counsellor_repo::load_counsellor(pool, counsellor_id)
        .await?
        .is_none()
    {
        return Err(AppError::bad_request("Selected counsellor does not exist"));
    }

    let password_hash = hash_password_blocking(req.password.clone()).await?;

    let mut tx = begin_write(pool).await?;
    let branch_id = match branch_repo::load_branch_by_code(&mut *tx, &branch_code).await? {
        Some(branch) => branch.branch_id,
        None => {
            let branch_id = Uuid::new_v4().to_string();
            branch_repo::insert_branch(&mut *tx, &branch_id, &branch_code, &branch_code, "TBD")
                .await?;
            info!(%branch_code, "branch created on first student registration");
            branch_id
        }
    };

    let inserted = student_repo::insert_student(
        &mut tx,
        student_repo::NewStudent {
            id,
            email,
            name,
            password_hash: &password_hash,
            usn: &usn,
            branch_id: &branch_id,
            counsellor_id,
            year,
            graduation_year,
        },
    )
    .await;
    if let Err(e) = inserted {
        if is_unique_violation(&e) {
            return Err(AppError::conflict("User with this email already exists"));
        }
        return Err(e.into());
    }
    tx.commit().await?;

    Ok(SessionUser {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: Role::Student,
    })
}

async fn register_club(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    req: &RegisterRequest,
) -> AppResult<SessionUser> {
    let (Some(club_name), Some(club_type)) = (
        non_empty(req.club_name.as_deref()),
        non_empty(req.club_type.as_deref()),
    ) else {
        return Err(AppError::bad_request(
            "Club name and type are required for club registration",
        ));
    };
    let club_type: Category = club_type.parse().map_err(|_| {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        AppError::bad_request(format!(
            "Invalid club type. Must be one of: {}",
            names.join(", ")
        ))
    })?;

    let faculty_in_charge = non_empty(req.faculty_in_charge.as_deref());
    if let Some(counsellor_id) = faculty_in_charge {
        if counsellor_repo::load_counsellor(pool, counsellor_id)
            .await?
            .is_none()
        {
            return Err(AppError::bad_request("Faculty in charge does not exist"));
        }
    }

    let password_hash = hash_password_blocking(req.password.clone()).await?;
    let inserted = club_repo::insert_club(
        pool,
        club_repo::NewClub {
            id,
            email,
            name: club_name,
            password_hash: &password_hash,
            club_type,
            description: req.description.as_deref().unwrap_or("").trim(),
            faculty_in_charge,
        },
    )
    .await;
    if let Err(e) = inserted {
        if is_unique_violation(&e) {
            return Err(AppError::conflict("User with this email already exists"));
        }
        return Err(e.into());
    }

    Ok(SessionUser {
        id: id.to_string(),
        name: club_name.to_string(),
        email: email.to_string(),
        role: Role::Club,
    })
}

pub async fn login(pool: &SqlitePool, config: &Config, req: LoginRequest) -> AppResult<LoginOutcome> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() || req.role.trim().is_empty() {
        return Err(AppError::bad_request(
            "Email, password, and role are required",
        ));
    }
    let role: Role = req
        .role
        .parse()
        .map_err(|_| AppError::bad_request("Invalid role"))?;

    // Same answer for unknown account and wrong password.
    let Some(creds) = load_credentials(pool, role, &email).await? else {
        warn!(%email, %role, "login for unknown account");
        return Err(AppError::unauthorized("Invalid credentials"));
    };
    if !verify_password_blocking(creds.password_hash.clone(), req.password).await? {
        warn!(%email, %role, "login with wrong password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = token_service::issue_token(config, &creds.id, &creds.email, role)?;
    info!(user_id = %creds.id, %role, "login succeeded");

    Ok(LoginOutcome {
        token,
        user: SessionUser {
            id: creds.id,
            name: creds.name,
            email: creds.email,
            role,
        },
        dashboard_path: role.as_str().to_string(),
    })
}

pub async fn create_counsellor(
    pool: &SqlitePool,
    actor: Actor<'_>,
    req: NewCounsellorRequest,
) -> AppResult<CounsellorsRow> {
    access::authorize(actor, Capability::ManageAccounts)?;

    let email = normalize_email(&req.email);
    let name = req.name.trim();
    let branch_id = req.branch_id.trim();
    if name.is_empty() || email.is_empty() || req.password.is_empty() || branch_id.is_empty() {
        return Err(AppError::bad_request("All fields are required"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Password must be at least 6 characters long",
        ));
    }
    if branch_repo::load_branch(pool, branch_id).await?.is_none() {
        return Err(AppError::not_found("Branch not found"));
    }
    if counsellor_repo::load_credentials(pool, &email).await?.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let id = Uuid::new_v4().to_string();
    counsellor_repo::insert_counsellor(
        pool,
        counsellor_repo::NewCounsellor {
            id: &id,
            email: &email,
            name,
            password_hash: &password_hash,
            branch_id,
            is_club_counsellor: req.is_club_counsellor,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict("Email already registered")
        } else {
            e.into()
        }
    })?;

    info!(counsellor_id = %id, created_by = %actor.id, "counsellor created");
    counsellor_repo::load_counsellor(pool, &id)
        .await?
        .ok_or_else(|| AppError::internal("counsellor vanished after insert"))
}

pub async fn create_branch(
    pool: &SqlitePool,
    actor: Actor<'_>,
    req: NewBranchRequest,
) -> AppResult<BranchesRow> {
    access::authorize(actor, Capability::ManageAccounts)?;

    let name = req.name.trim();
    let code = req.code.trim().to_uppercase();
    if name.is_empty() || code.is_empty() {
        return Err(AppError::bad_request("Branch name and code are required"));
    }
    let hod = non_empty(req.hod.as_deref()).unwrap_or("TBD");

    let id = Uuid::new_v4().to_string();
    branch_repo::insert_branch(pool, &id, name, &code, hod)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("A branch with this name or code already exists")
            } else {
                e.into()
            }
        })?;

    branch_repo::load_branch(pool, &id)
        .await?
        .ok_or_else(|| AppError::internal("branch vanished after insert"))
}

/// Creates the configured admin when no admin account exists yet.
/// Returns whether an account was created.
pub async fn bootstrap_admin(pool: &SqlitePool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if admin_repo::count_admins(pool).await? > 0 {
        return Ok(false);
    }
    let email = normalize_email(&admin.email);
    let password_hash = hash_password_blocking(admin.password.clone()).await?;
    let id = Uuid::new_v4().to_string();
    admin_repo::insert_admin(
        pool,
        admin_repo::NewAdmin {
            id: &id,
            email: &email,
            name: admin.name.trim(),
            password_hash: &password_hash,
            role: Role::Admin,
        },
    )
    .await?;
    info!(%email, "bootstrap admin created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret!"));
        assert!(!verify_password(&hash, "s3cret?"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn emails_are_normalised() {
        assert_eq!(normalize_email("  Club@College.EDU "), "club@college.edu");
    }
}
