//! User repository.
//!
//! Users are JSON records under `user:{login}`, written once with `SET NX` so
//! two concurrent registrations of the same login cannot both succeed.

use chrono::{DateTime, Utc};
use icecream_core::{Login, UserOut};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::KeyValueStore;
use super::{RepositoryError, keys};

/// A stored user, including the password hash.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: Login,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view without the hash.
    #[must_use]
    pub fn to_public(&self) -> UserOut {
        UserOut {
            login: self.login.clone(),
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("login", &self.login)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Repository for user records.
pub struct UserRepository<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Store a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the login is already taken.
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn create(
        &self,
        login: &Login,
        password_hash: &str,
    ) -> Result<UserOut, RepositoryError> {
        let record = UserRecord {
            login: login.clone(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode user: {e}")))?;

        if !self.store.set_if_absent(&keys::user(login), &json).await? {
            return Err(RepositoryError::Conflict(format!(
                "user with login '{login}' already exists"
            )));
        }

        info!(login = %login, "User created");
        Ok(record.to_public())
    }

    /// Get a user record by login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    /// Returns `RepositoryError::DataCorruption` if the stored record cannot be decoded.
    pub async fn get(&self, login: &Login) -> Result<Option<UserRecord>, RepositoryError> {
        let Some(json) = self.store.get(&keys::user(login)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json).map(Some).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user record for '{login}': {e}"))
        })
    }

    /// Whether a user with this login exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn exists(&self, login: &Login) -> Result<bool, RepositoryError> {
        Ok(self.store.exists(&keys::user(login)).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn login(s: &str) -> Login {
        Login::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(&store);

        let created = repo.create(&login("bestboss"), "hash").await.unwrap();
        assert_eq!(created.login, login("bestboss"));

        let record = repo.get(&login("bestboss")).await.unwrap().unwrap();
        assert_eq!(record.password_hash, "hash");
        assert_eq!(record.created_at, created.created_at);
        assert!(repo.exists(&login("bestboss")).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_login_conflicts() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(&store);

        repo.create(&login("bestboss"), "first").await.unwrap();
        let second = repo.create(&login("bestboss"), "second").await;

        assert!(matches!(second, Err(RepositoryError::Conflict(_))));
        let record = repo.get(&login("bestboss")).await.unwrap().unwrap();
        assert_eq!(record.password_hash, "first");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(&store);
        assert!(repo.get(&login("nobody")).await.unwrap().is_none());
        assert!(!repo.exists(&login("nobody")).await.unwrap());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let record = UserRecord {
            login: login("bestboss"),
            password_hash: "secret-hash".to_string(),
            created_at: Utc::now(),
        };
        assert!(!format!("{record:?}").contains("secret-hash"));
    }
}
