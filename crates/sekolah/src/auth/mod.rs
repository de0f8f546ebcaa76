//! Login, sessions and role checks for the administrator panel and the parent portal.

pub mod credentials;
pub mod middleware;
pub mod router;
pub mod session;

use serde::{Deserialize, Serialize};

pub use credentials::{hash_password, verify_password, CredentialStore};
pub use middleware::{require_admin, require_parent, AuthState};
pub use router::auth_router;
pub use session::{Session, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// A parent account linked to one student.
    Parent { student_id: String },
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    #[serde(flatten)]
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    pub fn student_id(&self) -> Option<&str> {
        match &self.role {
            Role::Parent { student_id } => Some(student_id.as_str()),
            Role::Admin => None,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("session expired or unknown")]
    InvalidToken,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Checks credentials and resolves the principal they belong to.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError>;
}
