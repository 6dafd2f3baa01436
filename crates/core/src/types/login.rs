//! User login type.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Login`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The input string is empty.
    #[error("login cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("login must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot travel in HTTP Basic credentials.
    #[error("login cannot contain {0:?}")]
    InvalidCharacter(char),
}

/// A user login.
///
/// The login is the uniqueness key for users and travels as the username of
/// HTTP Basic credentials, so it cannot contain `:` or whitespace.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - No `:` and no whitespace
///
/// ## Examples
///
/// ```
/// use icecream_core::Login;
///
/// assert!(Login::parse("bestboss").is_ok());
///
/// assert!(Login::parse("").is_err());
/// assert!(Login::parse("best:boss").is_err());
/// assert!(Login::parse("best boss").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Login(String);

impl Login {
    /// Maximum length of a login, in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Login` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains `:` or whitespace.
    pub fn parse(s: &str) -> Result<Self, LoginError> {
        if s.is_empty() {
            return Err(LoginError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(LoginError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s.chars().find(|c| *c == ':' || c.is_whitespace()) {
            return Err(LoginError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the login as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Login` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Login {
    type Err = LoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Login {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Login {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
