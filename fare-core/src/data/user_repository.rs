use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::data::store::{KeyValueStore, StoreError, load_json, store_json};
use crate::domain::user::{StoredAccount, User};

pub const USERS_KEY: &str = "taxi_app_users";
pub const CURRENT_USER_KEY: &str = "taxi_app_current_user";

type Directory = BTreeMap<String, StoredAccount>;

pub trait UserRepository: Send + Sync {
    fn create(&self, email: &str, account: StoredAccount) -> Result<(), StoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<StoredAccount>, StoreError>;
    fn list(&self) -> Result<Vec<User>, StoreError>;
    fn current_session(&self) -> Option<User>;
    fn set_current_session(&self, user: &User) -> Result<(), StoreError>;
    fn clear_current_session(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct StoreUserRepository<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> StoreUserRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn directory(&self) -> Result<Directory, StoreError> {
        Ok(load_json(self.store.as_ref(), USERS_KEY)?.unwrap_or_default())
    }
}

impl<S: KeyValueStore> UserRepository for StoreUserRepository<S> {
    /// Inserts or overwrites the entry keyed by the raw email.
    fn create(&self, email: &str, account: StoredAccount) -> Result<(), StoreError> {
        let mut directory = self.directory()?;
        directory.insert(email.to_string(), account);
        store_json(self.store.as_ref(), USERS_KEY, &directory).map_err(|e| {
            error!("failed to store user directory: {}", e);
            e
        })?;

        info!(email = %email, "user created");
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<StoredAccount>, StoreError> {
        Ok(self.directory()?.remove(email))
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .directory()?
            .into_iter()
            .map(|(email, account)| account.into_user(email))
            .collect())
    }

    /// An unreadable session record counts as nobody signed in.
    fn current_session(&self) -> Option<User> {
        load_json(self.store.as_ref(), CURRENT_USER_KEY)
            .map_err(|e| error!("failed to read current session: {}", e))
            .ok()
            .flatten()
    }

    fn set_current_session(&self, user: &User) -> Result<(), StoreError> {
        store_json(self.store.as_ref(), CURRENT_USER_KEY, user)
    }

    fn clear_current_session(&self) -> Result<(), StoreError> {
        self.store.remove(CURRENT_USER_KEY)
    }
}
