//! Role based authorisation. Every route resolves what it needs through
//! [`authorize`]; resource ownership (own club, own advisees) is checked
//! by the helpers below once the resource is loaded.

use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::{Role, StudentsRow};

/// The authenticated caller as services see it.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub id: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreateEvent,
    ApproveEvent,
    TransitionEvent,
    RegisterForEvent,
    VerifyParticipation,
    ManageCertificates,
    ListStudents,
    ViewRegistrations,
    ManageAccounts,
    Reconcile,
}

impl Capability {
    fn denial_message(self) -> &'static str {
        match self {
            Capability::CreateEvent => "Only clubs and admins can create events",
            Capability::ApproveEvent => "Admin access required",
            Capability::TransitionEvent => "Only clubs and admins can change event status",
            Capability::RegisterForEvent => "Only students can register for events",
            Capability::VerifyParticipation => "Counsellor or admin access required",
            Capability::ManageCertificates => "Counsellor or admin access required",
            Capability::ListStudents => "Counsellor or admin access required",
            Capability::ViewRegistrations => "Not allowed to view registrations",
            Capability::ManageAccounts => "Admin access required",
            Capability::Reconcile => "Admin access required",
        }
    }
}

pub fn allows(role: Role, capability: Capability) -> bool {
    use Capability::*;

    match capability {
        CreateEvent | TransitionEvent => role == Role::Club || role.is_admin(),
        ApproveEvent | ManageAccounts | Reconcile => role.is_admin(),
        RegisterForEvent => role == Role::Student,
        VerifyParticipation | ManageCertificates | ListStudents => {
            role == Role::Counsellor || role.is_admin()
        }
        ViewRegistrations => matches!(role, Role::Club | Role::Counsellor) || role.is_admin(),
    }
}

pub fn authorize(actor: Actor<'_>, capability: Capability) -> AppResult<()> {
    if allows(actor.role, capability) {
        return Ok(());
    }
    warn!(
        user_id = %actor.id,
        role = %actor.role,
        capability = ?capability,
        "capability denied"
    );
    Err(AppError::forbidden(capability.denial_message()))
}

/// Students see themselves, counsellors their advisees, admins everyone.
pub fn ensure_student_scope(actor: Actor<'_>, student: &StudentsRow) -> AppResult<()> {
    let allowed = match actor.role {
        Role::Admin | Role::Dean => true,
        Role::Counsellor => student.counsellor_id == actor.id,
        Role::Student => student.student_id == actor.id,
        Role::Club => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You can only access your assigned students",
        ))
    }
}

/// Clubs act on their own events only; admins on any.
pub fn ensure_club_scope(actor: Actor<'_>, club_id: &str) -> AppResult<()> {
    if actor.role == Role::Club && actor.id != club_id {
        return Err(AppError::forbidden(
            "You can only manage your own club's events",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(counsellor_id: &str) -> StudentsRow {
        StudentsRow {
            student_id: "s-1".to_string(),
            email: "s1@college.edu".to_string(),
            name: "Asha".to_string(),
            usn: "1XX21CS001".to_string(),
            branch_id: "b-1".to_string(),
            counsellor_id: counsellor_id.to_string(),
            year: 2,
            graduation_year: 2027,
            activity_point: 0,
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn capability_table() {
        assert!(allows(Role::Admin, Capability::ApproveEvent));
        assert!(allows(Role::Dean, Capability::ApproveEvent));
        assert!(!allows(Role::Club, Capability::ApproveEvent));
        assert!(!allows(Role::Counsellor, Capability::ApproveEvent));

        assert!(allows(Role::Club, Capability::CreateEvent));
        assert!(!allows(Role::Student, Capability::CreateEvent));

        assert!(allows(Role::Student, Capability::RegisterForEvent));
        assert!(!allows(Role::Admin, Capability::RegisterForEvent));

        assert!(allows(Role::Counsellor, Capability::VerifyParticipation));
        assert!(!allows(Role::Club, Capability::VerifyParticipation));
    }

    #[test]
    fn counsellor_scope_is_limited_to_advisees() {
        let row = student("c-1");
        let own = Actor { id: "c-1", role: Role::Counsellor };
        let other = Actor { id: "c-2", role: Role::Counsellor };
        assert!(ensure_student_scope(own, &row).is_ok());
        assert!(ensure_student_scope(other, &row).is_err());
        assert!(ensure_student_scope(Actor { id: "s-1", role: Role::Student }, &row).is_ok());
        assert!(ensure_student_scope(Actor { id: "s-2", role: Role::Student }, &row).is_err());
    }

    #[test]
    fn denial_is_forbidden() {
        let err = authorize(Actor { id: "x", role: Role::Student }, Capability::Reconcile)
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
