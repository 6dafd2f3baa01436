//! User-facing account types.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::login::Login;

/// Login and plaintext password, as sent on registration or in HTTP Basic
/// credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub login: Login,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub login: Login,
    pub created_at: DateTime<Utc>,
}

/// Token returned on a successful login.
///
/// Purely informational: it is neither stored nor checked, and protected
/// endpoints verify credentials on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: u32,
}
