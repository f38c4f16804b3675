//! Signed-in user session, read from the local store

use crate::storage::{keys, LocalStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bearer token for authenticated gateway calls
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Account role as stored by sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Teachers and admins may publish books
    pub fn can_upload(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

/// Read-only view of the signed-in user
///
/// Every component reads the token through this type; only [`SignIn`] writes it.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn LocalStore>,
}

impl Session {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Current auth token; a store failure reads as signed out
    pub fn token(&self) -> Option<AuthToken> {
        match self.store.get(keys::ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()).map(AuthToken),
            Err(e) => {
                tracing::warn!("Failed to read auth token: {}", e);
                None
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.read(keys::USER_ID)
            .and_then(|id| id.trim().parse().ok())
    }

    pub fn display_name(&self) -> Option<String> {
        self.read(keys::USER_NAME)
    }

    pub fn role(&self) -> Option<Role> {
        self.read(keys::USER_ROLE).as_deref().and_then(Role::parse)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).ok().flatten()
    }
}

/// Credentials handed over by the sign-in flow
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: AuthToken,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// The sign-in collaborator: the only writer of session keys
pub struct SignIn {
    store: Arc<dyn LocalStore>,
}

impl SignIn {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Persist credentials after a successful sign-in
    pub fn store_credentials(&self, credentials: &Credentials) -> StoreResult<()> {
        self.store
            .set(keys::ACCESS_TOKEN, credentials.token.as_str().to_string())?;
        self.put_optional(keys::USER_ID, credentials.user_id.map(|id| id.to_string()))?;
        self.put_optional(keys::USER_NAME, credentials.name.clone())?;
        self.put_optional(
            keys::USER_ROLE,
            credentials.role.map(|r| r.as_str().to_string()),
        )?;
        Ok(())
    }

    /// Remove every session key
    pub fn sign_out(&self) -> StoreResult<()> {
        for key in [keys::ACCESS_TOKEN, keys::USER_ID, keys::USER_NAME, keys::USER_ROLE] {
            self.store.remove(key)?;
        }
        Ok(())
    }

    fn put_optional(&self, key: &str, value: Option<String>) -> StoreResult<()> {
        match value {
            Some(v) => self.store.set(key, v),
            None => self.store.remove(key),
        }
    }
}
