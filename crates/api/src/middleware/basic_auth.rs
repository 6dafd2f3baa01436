//! HTTP Basic authentication extractors.
//!
//! [`BasicCredentials`] only decodes the `Authorization` header. [`Authenticated`]
//! also checks the credentials against the store and yields the caller's login;
//! protected handlers take it as an argument.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn my_orders(Authenticated(login): Authenticated) -> impl IntoResponse {
//!     format!("Hello, {login}!")
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use icecream_core::{Credentials, Login};

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Decoded HTTP Basic credentials, not yet verified.
#[derive(Debug)]
pub struct BasicCredentials(pub Credentials);

impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("not authenticated".to_string()))?;

        parse_basic(header_value)
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))
    }
}

/// The login of a caller whose Basic credentials matched a stored user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Login);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BasicCredentials(credentials) =
            BasicCredentials::from_request_parts(parts, state).await?;

        let login = state.auth().authenticate(&credentials).await?;
        set_sentry_user(&login);

        Ok(Self(login))
    }
}

/// Decode `Basic base64(login:password)`. The password may contain `:`.
fn parse_basic(value: &str) -> Option<Credentials> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (login, password) = decoded.split_once(':')?;

    Some(Credentials {
        login: Login::parse(login).ok()?,
        password: password.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parse_basic() {
        let credentials = parse_basic(&encode("bestboss:Pa$$w0rd!")).unwrap();
        assert_eq!(credentials.login.as_str(), "bestboss");
        assert_eq!(credentials.password, "Pa$$w0rd!");
    }

    #[test]
    fn test_password_may_contain_colon() {
        let credentials = parse_basic(&encode("bestboss:a:b")).unwrap();
        assert_eq!(credentials.password, "a:b");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let value = format!("basic {}", STANDARD.encode("bestboss:x"));
        assert!(parse_basic(&value).is_some());
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert!(parse_basic("Bearer abc").is_none());
        assert!(parse_basic("Basic !!!not-base64").is_none());
        assert!(parse_basic(&encode("no-colon")).is_none());
        assert!(parse_basic(&encode(":password")).is_none());
        assert!(parse_basic("Basic").is_none());
    }
}
