use serde::{Deserialize, Serialize};

use crate::domain::UserRef;
use crate::error::DomainError;

/// Capability flag granting base access to the workflow.
pub const ROLE_SOCIAL: &str = "social";
/// Capability flag granting admin actions (approve, mark posted).
pub const ROLE_SOCIAL_ADMIN: &str = "socialAdmin";

/// Normalized capability set, resolved once when the session is loaded.
///
/// Callers never re-derive permissions from raw role strings; every check
/// goes through this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub editor: bool,
    pub admin: bool,
}

impl Capabilities {
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        let admin = roles.iter().any(|r| r.as_ref() == ROLE_SOCIAL_ADMIN);
        let editor = admin || roles.iter().any(|r| r.as_ref() == ROLE_SOCIAL);
        Self { editor, admin }
    }

    /// Whether the holder has any access to the system at all.
    pub fn any(&self) -> bool {
        self.editor || self.admin
    }
}

/// Explicit per-request session context passed to every workflow operation.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserRef,
    pub caps: Capabilities,
}

impl Session {
    /// Resolve a session from validated token claims. Callers without the
    /// base capability flag (or its elevated variant) are denied outright.
    pub fn resolve<S: AsRef<str>>(
        uid: String,
        email: String,
        roles: &[S],
    ) -> Result<Self, DomainError> {
        let caps = Capabilities::from_roles(roles);
        if !caps.any() {
            return Err(DomainError::Forbidden("access the workflow"));
        }
        Ok(Self {
            user: UserRef { uid, email },
            caps,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.caps.admin
    }
}
