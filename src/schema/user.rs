use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

use crate::util::Sensitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Managers can see every project.
    Manager,
    /// Employees only see the projects they are assigned to.
    Employee,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown {0:?} user role")]
pub struct InvalidUserRole(String);

// Role strings are compared exactly as the clients send them.
impl FromStr for UserRole {
    type Err = InvalidUserRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANAGER" => Ok(Self::Manager),
            "EMPLOYEE" => Ok(Self::Employee),
            _ => Err(InvalidUserRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    /// Stored as is. It is never serialized into API responses.
    #[serde(skip_serializing)]
    pub password: Option<Sensitive<String>>,
}

impl User {
    /// Compares the stored credential with the given one.
    ///
    /// Users without a stored password, or attempts without
    /// a password, are always accepted.
    #[must_use]
    pub fn accepts_password(&self, attempt: Option<&str>) -> bool {
        match (self.password.as_ref(), attempt) {
            (Some(stored), Some(attempt)) => stored.as_str() == attempt,
            _ => true,
        }
    }
}
