//! Authentication service.
//!
//! Provides registration, login, and per-request credential checks for
//! HTTP Basic authentication. There are no sessions: protected endpoints
//! verify the login and password on every call, and the token handed out by
//! [`AuthService::login`] is informational only.
//!
//! # Password hashes
//!
//! New hashes use the configured [`PasswordScheme`]. Verification detects the
//! format of the stored hash, so Argon2 PHC strings and legacy unsalted
//! SHA-256 hex digests can live side by side in one store.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use icecream_core::{Credentials, Login, SessionToken, UserOut};

use crate::config::PasswordScheme;
use crate::db::store::KeyValueStore;
use crate::db::{RepositoryError, UserRepository};

/// Range login tokens are drawn from.
const TOKEN_RANGE: std::ops::RangeInclusive<u32> = 1_000_000_000..=2_000_000_000;

/// Length of a hex-encoded SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    scheme: PasswordScheme,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore, scheme: PasswordScheme) -> Self {
        Self {
            users: UserRepository::new(store),
            scheme,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the login is taken.
    /// Returns `AuthError::PasswordHash` if the password cannot be hashed.
    pub async fn register(&self, credentials: &Credentials) -> Result<UserOut, AuthError> {
        let password_hash = hash_password(self.scheme, &credentials.password)?;

        self.users
            .create(&credentials.login, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Check credentials and hand out a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the login is unknown.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let user = self
            .users
            .get(&credentials.login)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&credentials.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        info!(login = %credentials.login, "User logged in");
        Ok(generate_session_token())
    }

    /// Check credentials on a protected call and return the caller's login.
    ///
    /// Unknown logins and wrong passwords are indistinguishable here.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the credentials do not match.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Login, AuthError> {
        if self.verify_credentials(credentials).await? {
            Ok(credentials.login.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Whether a user with this login exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store call fails.
    pub async fn user_exists(&self, login: &Login) -> Result<bool, AuthError> {
        Ok(self.users.exists(login).await?)
    }

    /// Whether the password matches the stored hash. False for unknown logins.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store call fails.
    pub async fn verify_credentials(&self, credentials: &Credentials) -> Result<bool, AuthError> {
        Ok(self
            .users
            .get(&credentials.login)
            .await?
            .is_some_and(|user| verify_password(&credentials.password, &user.password_hash)))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hash a password with the given scheme.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if Argon2 hashing fails.
pub fn hash_password(scheme: PasswordScheme, password: &str) -> Result<String, AuthError> {
    match scheme {
        PasswordScheme::Argon2 => {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|_| AuthError::PasswordHash)
        }
        PasswordScheme::Sha256Legacy => Ok(sha256_hex(password)),
    }
}

/// Verify a password against a stored hash of either supported format.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.starts_with("$argon2") {
        let Ok(parsed) = PasswordHash::new(stored) else {
            warn!("Stored Argon2 hash cannot be parsed");
            return false;
        };
        return Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
    }

    if stored.len() == SHA256_HEX_LEN && stored.bytes().all(|b| b.is_ascii_hexdigit()) {
        return sha256_hex(password).eq_ignore_ascii_case(stored);
    }

    warn!("Stored password hash has an unknown format");
    false
}

/// Unsalted SHA-256 of the UTF-8 password, hex encoded.
///
/// Insecure: identical passwords produce identical hashes.
#[must_use]
pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Draw a login token.
#[must_use]
pub fn generate_session_token() -> SessionToken {
    SessionToken {
        token: rand::rng().random_range(TOKEN_RANGE),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn credentials(login: &str, password: &str) -> Credentials {
        Credentials {
            login: Login::parse(login).unwrap(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hash = hash_password(PasswordScheme::Argon2, "Pa$$w0rd!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Pa$$w0rd!", &hash));
        assert!(!verify_password("Pa$$w0rd", &hash));
    }

    #[test]
    fn test_argon2_hashes_are_salted() {
        let a = hash_password(PasswordScheme::Argon2, "same").unwrap();
        let b = hash_password(PasswordScheme::Argon2, "same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_legacy_hash_is_deterministic() {
        let a = hash_password(PasswordScheme::Sha256Legacy, "Pa$$w0rd!").unwrap();
        let b = hash_password(PasswordScheme::Sha256Legacy, "Pa$$w0rd!").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), SHA256_HEX_LEN);
        assert!(verify_password("Pa$$w0rd!", &a));
        assert!(!verify_password("other", &a));
    }

    #[test]
    fn test_sha256_known_digest() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_unknown_hash_format_never_verifies() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("x", "plaintext"));
    }

    #[test]
    fn test_token_range() {
        for _ in 0..100 {
            let token = generate_session_token().token;
            assert!(TOKEN_RANGE.contains(&token));
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, PasswordScheme::Sha256Legacy);

        let user = auth.register(&credentials("bestboss", "Pa$$w0rd!")).await.unwrap();
        assert_eq!(user.login.as_str(), "bestboss");

        let token = auth.login(&credentials("bestboss", "Pa$$w0rd!")).await.unwrap();
        assert!(TOKEN_RANGE.contains(&token.token));
        assert!(auth.user_exists(&user.login).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_keeps_first_password() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, PasswordScheme::Sha256Legacy);

        auth.register(&credentials("bestboss", "first")).await.unwrap();
        let second = auth.register(&credentials("bestboss", "second")).await;
        assert!(matches!(second, Err(AuthError::UserAlreadyExists)));

        assert!(auth.verify_credentials(&credentials("bestboss", "first")).await.unwrap());
        assert!(!auth.verify_credentials(&credentials("bestboss", "second")).await.unwrap());
    }

    #[tokio::test]
    async fn test_login_distinguishes_unknown_user() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, PasswordScheme::Sha256Legacy);
        auth.register(&credentials("bestboss", "Pa$$w0rd!")).await.unwrap();

        assert!(matches!(
            auth.login(&credentials("nobody", "x")).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.login(&credentials("bestboss", "wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_hides_unknown_user() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, PasswordScheme::Sha256Legacy);
        auth.register(&credentials("bestboss", "Pa$$w0rd!")).await.unwrap();

        let login = auth
            .authenticate(&credentials("bestboss", "Pa$$w0rd!"))
            .await
            .unwrap();
        assert_eq!(login.as_str(), "bestboss");

        assert!(matches!(
            auth.authenticate(&credentials("nobody", "x")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_schemes_coexist_in_one_store() {
        let store = MemoryStore::new();
        AuthService::new(&store, PasswordScheme::Sha256Legacy)
            .register(&credentials("legacy", "old-pass"))
            .await
            .unwrap();

        let auth = AuthService::new(&store, PasswordScheme::Argon2);
        auth.register(&credentials("modern", "new-pass")).await.unwrap();

        assert!(auth.verify_credentials(&credentials("legacy", "old-pass")).await.unwrap());
        assert!(auth.verify_credentials(&credentials("modern", "new-pass")).await.unwrap());
    }
}
