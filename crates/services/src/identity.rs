//! Identity collaborator.
//!
//! The exam never manages users; it only asks who is signed in and whether
//! they hold the candidate role.

use std::fmt;
use std::str::FromStr;

use exam_core::model::UserId;

/// Role a signed-in user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Candidate,
    Reviewer,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Reviewer => "reviewer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a role from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" => Ok(Role::Candidate),
            "reviewer" => Ok(Role::Reviewer),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

/// Provider of the current user.
pub trait Identity: Send + Sync {
    fn current_user_id(&self) -> Option<UserId>;

    fn is_authenticated(&self, role: Role) -> bool;
}

/// Identity fixed at construction, e.g. from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticIdentity {
    user: Option<(UserId, Role)>,
}

impl StaticIdentity {
    #[must_use]
    pub fn signed_in(user_id: UserId, role: Role) -> Self {
        Self {
            user: Some((user_id, role)),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl Identity for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.user.map(|(id, _)| id)
    }

    fn is_authenticated(&self, role: Role) -> bool {
        self.user.is_some_and(|(_, held)| held == role)
    }
}
