//! User route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use icecream_core::{Credentials, SessionToken, UserOut};

use crate::error::Result;
use crate::extract::Json;
use crate::middleware::BasicCredentials;
use crate::state::AppState;

/// Register a new user.
#[instrument(skip_all, fields(login = %credentials.login))]
pub async fn create(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<UserOut>)> {
    let user = state.auth().register(&credentials).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Check HTTP Basic credentials and return a token.
#[instrument(skip_all, fields(login = %credentials.login))]
pub async fn login(
    State(state): State<AppState>,
    BasicCredentials(credentials): BasicCredentials,
) -> Result<Json<SessionToken>> {
    Ok(Json(state.auth().login(&credentials).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_register_returns_public_view() {
        let app = TestApp::new();
        let (status, body) = app
            .json(
                Method::POST,
                "/api/user/new",
                &json!({ "login": "bestboss", "password": "Pa$$w0rd!" }),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["login"], "bestboss");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_empty_login_is_detail_json() {
        let app = TestApp::new();
        let (status, body) = app
            .json(
                Method::POST,
                "/api/user/new",
                &json!({ "login": "", "password": "x" }),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("login cannot be empty"));
    }

    #[tokio::test]
    async fn test_register_duplicate_conflicts() {
        let app = TestApp::new();
        app.register("bestboss", "first").await;

        let (status, body) = app
            .json(
                Method::POST,
                "/api/user/new",
                &json!({ "login": "bestboss", "password": "second" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "user with this login already exists");

        let (status, _) = app.login("bestboss", "first").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login() {
        let app = TestApp::new();
        app.register("bestboss", "Pa$$w0rd!").await;

        let (status, body) = app.login("bestboss", "Pa$$w0rd!").await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_u64().unwrap();
        assert!((1_000_000_000..=2_000_000_000).contains(&token));

        let (status, body) = app.login("bestboss", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid credentials");

        let (status, body) = app.login("nobody", "x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "user not found");
    }

    #[tokio::test]
    async fn test_login_without_credentials() {
        let app = TestApp::new();
        let (status, _) = app.send(Method::POST, "/api/user/login", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
