use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::data::user_repository::UserRepository;
use crate::domain::user::{
    AuthFailure, AuthOutcome, RESERVED_IDENTITY, Role, StoredAccount, User,
};
use crate::infrastructure::security::{hash_password, verify_password};

/// Fixed password of the built-in administrator. Local simulation only: the
/// value is public and the admin account never touches the directory.
pub const ADMIN_PASSWORD: &str = "Admin";

fn is_reserved(email: &str) -> bool {
    email.eq_ignore_ascii_case(RESERVED_IDENTITY)
}

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, password))]
    pub fn register(&self, email: &str, password: &str) -> AuthOutcome {
        if is_reserved(email) {
            return AuthFailure::ReservedName.into();
        }
        if email.trim().is_empty() || password.is_empty() {
            return AuthFailure::MissingFields.into();
        }

        match self.repo.find_by_email(email) {
            Ok(Some(_)) => return AuthFailure::AlreadyRegistered.into(),
            Ok(None) => {}
            Err(e) => return AuthFailure::Unavailable(e.to_string()).into(),
        }

        let password_hash = match hash_password(password) {
            Ok(hash) => hash,
            Err(e) => {
                error!("failed to hash password: {}", e);
                return AuthFailure::Unavailable(e.to_string()).into();
            }
        };
        let account = StoredAccount {
            role: Role::User,
            created_at: Utc::now(),
            password_hash,
        };
        let user = account.clone().into_user(email.to_string());

        match self.repo.create(email, account) {
            Ok(()) => AuthOutcome::Success { user },
            Err(e) => AuthFailure::Unavailable(e.to_string()).into(),
        }
    }

    /// Signs in and records the current session. A session that cannot be
    /// written is logged; the returned user is still signed in for this run.
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let user = if is_reserved(email) && password == ADMIN_PASSWORD {
            User::admin()
        } else {
            match self.check_directory(email, password) {
                Ok(user) => user,
                Err(reason) => {
                    warn!(email = %email, "login rejected: {}", reason);
                    return reason.into();
                }
            }
        };

        if let Err(e) = self.repo.set_current_session(&user) {
            error!("failed to store current session: {}", e);
        }
        info!(email = %user.email, role = %user.role, "signed in");
        AuthOutcome::Success { user }
    }

    fn check_directory(&self, email: &str, password: &str) -> Result<User, AuthFailure> {
        let account = self
            .repo
            .find_by_email(email)
            .map_err(|e| AuthFailure::Unavailable(e.to_string()))?
            .ok_or(AuthFailure::InvalidCredentials)?;

        let valid = verify_password(password, &account.password_hash)
            .map_err(|_| AuthFailure::InvalidCredentials)?;
        if !valid {
            return Err(AuthFailure::InvalidCredentials);
        }
        Ok(account.into_user(email.to_string()))
    }

    pub fn logout(&self) {
        if let Err(e) = self.repo.clear_current_session() {
            error!("failed to clear current session: {}", e);
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.repo.current_session()
    }

    /// Every registered account. Order is not meaningful.
    pub fn list_all(&self) -> Vec<User> {
        self.repo.list().unwrap_or_else(|e| {
            error!("failed to read user directory: {}", e);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::{KeyValueStore, MemoryStore, load_json};
    use crate::data::user_repository::{StoreUserRepository, USERS_KEY};
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn service() -> (Arc<MemoryStore>, AuthService<StoreUserRepository<MemoryStore>>) {
        let store = Arc::new(MemoryStore::new());
        let repo = Arc::new(StoreUserRepository::new(Arc::clone(&store)));
        (store, AuthService::new(repo))
    }

    #[rstest]
    #[case("admin")]
    #[case("Admin")]
    #[case("ADMIN")]
    #[case("aDmIn")]
    fn reserved_name_cannot_register(#[case] email: &str) {
        let (_, auth) = service();
        assert_eq!(
            auth.register(email, "x"),
            AuthOutcome::Failure {
                reason: AuthFailure::ReservedName
            }
        );
        assert!(auth.list_all().is_empty());
    }

    #[test]
    fn register_creates_regular_user() {
        let (_, auth) = service();
        let user = auth.register("ana@example.com", "pw").into_result().unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(auth.list_all(), vec![user]);
    }

    #[test]
    fn register_rejects_duplicates_and_blanks() {
        let (_, auth) = service();
        auth.register("ana@example.com", "pw").into_result().unwrap();
        assert_eq!(
            auth.register("ana@example.com", "other").into_result(),
            Err(AuthFailure::AlreadyRegistered)
        );
        assert_eq!(
            auth.register("  ", "pw").into_result(),
            Err(AuthFailure::MissingFields)
        );
        assert_eq!(
            auth.register("bia@example.com", "").into_result(),
            Err(AuthFailure::MissingFields)
        );
    }

    #[test]
    fn password_is_not_stored_verbatim() {
        let (store, auth) = service();
        auth.register("ana@example.com", "plain-secret").into_result().unwrap();
        let directory: BTreeMap<String, StoredAccount> =
            load_json(store.as_ref(), USERS_KEY).unwrap().unwrap();
        let stored = &directory["ana@example.com"];
        assert_ne!(stored.password_hash, "plain-secret");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn admin_login_always_succeeds_and_is_not_listed() {
        let (_, auth) = service();
        auth.register("ana@example.com", "pw").into_result().unwrap();

        let admin = auth.login("admin", "Admin").into_result().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.email, "Admin");
        assert_eq!(auth.current_user().map(|u| u.role), Some(Role::Admin));
        assert!(auth.list_all().iter().all(|u| u.email != "Admin"));
    }

    #[test]
    fn admin_with_wrong_password_is_rejected() {
        let (_, auth) = service();
        assert_eq!(
            auth.login("admin", "admin").into_result(),
            Err(AuthFailure::InvalidCredentials)
        );
        assert_eq!(auth.current_user(), None);
    }

    #[test]
    fn directory_login_checks_exact_key_and_password() {
        let (_, auth) = service();
        auth.register("Ana@example.com", "pw").into_result().unwrap();

        assert_eq!(
            auth.login("ana@example.com", "pw").into_result(),
            Err(AuthFailure::InvalidCredentials)
        );
        assert_eq!(
            auth.login("Ana@example.com", "PW").into_result(),
            Err(AuthFailure::InvalidCredentials)
        );

        let user = auth.login("Ana@example.com", "pw").into_result().unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(auth.current_user(), Some(user));
    }

    #[test]
    fn logout_clears_the_session() {
        let (_, auth) = service();
        auth.login("Admin", "Admin").into_result().unwrap();
        auth.logout();
        assert_eq!(auth.current_user(), None);
    }

    #[test]
    fn register_reports_storage_failure() {
        let store = Arc::new(MemoryStore::with_quota(4));
        let auth = AuthService::new(Arc::new(StoreUserRepository::new(Arc::clone(&store))));
        assert!(matches!(
            auth.register("ana@example.com", "pw").into_result(),
            Err(AuthFailure::Unavailable(_))
        ));
        assert_eq!(store.get(USERS_KEY).unwrap(), None);
    }
}
