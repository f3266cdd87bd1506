use crate::domain::error::DomainError;
use crate::domain::user::User;

/// Who is signed in for the current run of the application.
///
/// Owned by the controller and passed by reference into the services; nothing
/// below the controller reads the persisted session record on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn require_user(&self) -> Result<&User, DomainError> {
        self.user.as_ref().ok_or(DomainError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<&User, DomainError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(DomainError::Forbidden)
        }
    }
}
