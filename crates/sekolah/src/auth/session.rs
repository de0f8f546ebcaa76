use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use super::{AuthError, Principal};

const TOKEN_BYTES: usize = 32;

/// A login session handed back to the client as an opaque bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

/// Server-side token to principal map.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(12))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue(&self, principal: Principal) -> Session {
        let session = Session {
            token: generate_token(),
            principal,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(session.token.clone(), session.clone());
        info!(username = %session.principal.username, "session issued");
        session
    }

    /// Principal behind `token`. Expired sessions are dropped on lookup.
    pub fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.principal.clone()),
            Some(_) => {
                sessions.remove(token);
                Err(AuthError::InvalidToken)
            }
            None => Err(AuthError::InvalidToken),
        }
    }

    /// Returns whether a session was removed.
    pub fn revoke(&self, token: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .expect("session lock poisoned")
            .remove(token);
        if let Some(session) = &removed {
            info!(username = %session.principal.username, "session revoked");
        }
        removed.is_some()
    }
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn admin() -> Principal {
        Principal {
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn tokens_are_random_hex() {
        let store = SessionStore::default();
        let first = store.issue(admin());
        let second = store.issue(admin());

        assert_eq!(first.token.len(), TOKEN_BYTES * 2);
        assert!(first.token.bytes().all(|byte| byte.is_ascii_hexdigit()));
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn resolve_then_revoke() {
        let store = SessionStore::default();
        let session = store.issue(admin());

        assert_eq!(store.resolve(&session.token).expect("resolves"), admin());
        assert!(store.revoke(&session.token));
        assert!(!store.revoke(&session.token));
        assert!(matches!(
            store.resolve(&session.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_sessions_do_not_resolve() {
        let store = SessionStore::new(Duration::seconds(-1));
        let session = store.issue(admin());
        assert!(matches!(
            store.resolve(&session.token),
            Err(AuthError::InvalidToken)
        ));
        assert!(!store.revoke(&session.token));
    }
}
