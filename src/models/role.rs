use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which account table a caller authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Student,
    Club,
    Counsellor,
    Admin,
    Dean,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Club => "club",
            Role::Counsellor => "counsellor",
            Role::Admin => "admin",
            Role::Dean => "dean",
        }
    }

    /// Deans share the admins table and the admin capabilities.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::Dean)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "club" => Ok(Role::Club),
            "counsellor" | "counselor" => Ok(Role::Counsellor),
            "admin" => Ok(Role::Admin),
            "dean" => Ok(Role::Dean),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}
