use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The directory key that can never be registered; it always logs in as admin.
pub const RESERVED_IDENTITY: &str = "Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[display("user")]
    User,
    #[display("admin")]
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String) -> Self {
        Self {
            email,
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    pub fn admin() -> Self {
        Self {
            email: RESERVED_IDENTITY.to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Directory value; the email is the map key, not a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAccount {
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub password_hash: String,
}

impl StoredAccount {
    pub fn into_user(self, email: String) -> User {
        User {
            email,
            role: self.role,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("this user name is reserved")]
    ReservedName,
    #[error("please fill in both the email and the password")]
    MissingFields,
    #[error("this email is already registered")]
    AlreadyRegistered,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("the account store is unavailable: {0}")]
    Unavailable(String),
}

/// Result of a register or login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Success { user: User },
    Failure { reason: AuthFailure },
}

impl AuthOutcome {
    pub fn into_result(self) -> Result<User, AuthFailure> {
        match self {
            AuthOutcome::Success { user } => Ok(user),
            AuthOutcome::Failure { reason } => Err(reason),
        }
    }
}

impl From<AuthFailure> for AuthOutcome {
    fn from(reason: AuthFailure) -> Self {
        AuthOutcome::Failure { reason }
    }
}
