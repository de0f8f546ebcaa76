use std::collections::HashMap;
use std::sync::RwLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

use super::{AuthError, Authenticator, Credentials, Principal, Role};

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|err| AuthError::Hash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Clone)]
struct Account {
    password_hash: String,
    role: Role,
}

/// Username to argon2 hash and role.
#[derive(Debug, Default)]
pub struct CredentialStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes `password` and stores the account, replacing any previous one with that name.
    pub fn register(&self, username: &str, password: &str, role: Role) -> Result<(), AuthError> {
        let password_hash = hash_password(password)?;
        self.insert_hashed(username, password_hash, role);
        Ok(())
    }

    /// Stores an account whose password was hashed ahead of time.
    pub fn insert_hashed(&self, username: &str, password_hash: String, role: Role) {
        let mut accounts = self.accounts.write().expect("credential lock poisoned");
        accounts.insert(
            username.trim().to_string(),
            Account {
                password_hash,
                role,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.accounts.read().expect("credential lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Authenticator for CredentialStore {
    fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let username = credentials.username.trim();
        let account = self
            .accounts
            .read()
            .expect("credential lock poisoned")
            .get(username)
            .cloned();

        let Some(account) = account else {
            warn!(username, "login rejected: unknown account");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&credentials.password, &account.password_hash)? {
            warn!(username, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal {
            username: username.to_string(),
            role: account.role,
        })
    }
}
