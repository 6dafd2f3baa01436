//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as a JSON body
//! `{"detail": "..."}`; server-side failures are captured to Sentry and their
//! details are kept out of the response.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use icecream_core::ValidationError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::images::ImageError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Request body passed parsing but not field validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request body is not JSON of the expected shape.
    #[error("Invalid body: {0}")]
    Body(#[from] JsonRejection),

    /// Path parameters do not parse.
    #[error("Invalid path: {0}")]
    PathParams(#[from] PathRejection),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repository(err) | Self::Auth(AuthError::Repository(err)) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Body(rejection) => rejection.status(),
            Self::PathParams(rejection) => rejection.status(),
        }
    }

    /// Message sent to the client.
    #[must_use]
    pub fn detail(&self) -> String {
        match self.status() {
            StatusCode::SERVICE_UNAVAILABLE => return "Service unavailable".to_string(),
            StatusCode::BAD_GATEWAY => return "External service error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => return "Internal server error".to_string(),
            _ => {}
        }

        match self {
            Self::Repository(RepositoryError::NotFound) => "not found".to_string(),
            Self::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Auth(AuthError::UserAlreadyExists) => {
                "user with this login already exists".to_string()
            }
            Self::Auth(AuthError::UserNotFound) => "user not found".to_string(),
            Self::Auth(AuthError::InvalidCredentials) => "invalid credentials".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::Body(rejection) => rejection.body_text(),
            Self::PathParams(rejection) => rejection.body_text(),
            other => other.to_string(),
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::Image(ImageError::Fetch(_) | ImageError::InvalidUrl(_)) => {
            StatusCode::BAD_GATEWAY
        }
        RepositoryError::Store(_)
        | RepositoryError::DataCorruption(_)
        | RepositoryError::Image(ImageError::Write(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for an authenticated login.
pub fn set_sentry_user(login: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(login.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::StoreError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("ice cream 3".to_string());
        assert_eq!(err.to_string(), "Not found: ice cream 3");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UserNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ValidationError::ZeroQuantity { index: 0 }.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("test".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unreachable_store_is_service_unavailable() {
        let err: AppError =
            RepositoryError::Store(StoreError::Timeout(Duration::from_millis(5))).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.detail(), "Service unavailable");

        let nested: AppError = AuthError::Repository(RepositoryError::Store(
            StoreError::Timeout(Duration::from_millis(5)),
        ))
        .into();
        assert_eq!(nested.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_server_error_details_are_hidden() {
        let err: AppError = RepositoryError::DataCorruption("icecream:1 has no name".to_string()).into();
        assert_eq!(err.detail(), "Internal server error");
    }

    #[test]
    fn test_unauthorized_asks_for_basic_auth() {
        let response = AppError::Auth(AuthError::InvalidCredentials).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic"
        );
    }

    #[tokio::test]
    async fn test_body_is_detail_json() {
        let response = AppError::Auth(AuthError::UserAlreadyExists).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "user with this login already exists");
    }
}
