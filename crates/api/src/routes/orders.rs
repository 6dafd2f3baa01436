//! Order route handlers. Every handler requires HTTP Basic credentials.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use icecream_core::{Order, OrderPosition};

use crate::error::Result;
use crate::extract::Json;
use crate::middleware::Authenticated;
use crate::state::AppState;

/// Place an order for the authenticated user.
#[instrument(skip_all, fields(login = %login, positions = positions.len()))]
pub async fn create(
    State(state): State<AppState>,
    Authenticated(login): Authenticated,
    Json(positions): Json<Vec<OrderPosition>>,
) -> Result<(StatusCode, Json<Order>)> {
    Order::validate_positions(&positions)?;
    let order = state.orders().create(&login, positions).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List the authenticated user's orders.
#[instrument(skip_all, fields(login = %login))]
pub async fn mine(
    State(state): State<AppState>,
    Authenticated(login): Authenticated,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_for_user(&login).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_orders_are_private_and_ordered() {
        let app = TestApp::new();
        app.register("bestboss", "Pa$$w0rd!").await;
        app.register("other", "secret").await;

        let first = json!([{ "ice_cream_id": 1, "quantity": 2 }]);
        let second = json!([{ "icecream_id": 2, "quantity": 1 }, { "ice_cream_id": 3, "quantity": 4 }]);

        let (status, order) = app
            .authed(Method::POST, "/api/order/new", "bestboss", "Pa$$w0rd!", Some(&first))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["id"], 1);
        assert_eq!(order["user_login"], "bestboss");

        app.authed(Method::POST, "/api/order/new", "bestboss", "Pa$$w0rd!", Some(&second))
            .await;

        let (status, mine) = app
            .authed(Method::GET, "/api/order/my", "bestboss", "Pa$$w0rd!", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = mine
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(mine[1]["positions"][0]["ice_cream_id"], 2);

        let (_, theirs) = app
            .authed(Method::GET, "/api/order/my", "other", "secret", None)
            .await;
        assert_eq!(theirs, json!([]));
    }

    #[tokio::test]
    async fn test_orders_require_valid_credentials() {
        let app = TestApp::new();
        app.register("bestboss", "Pa$$w0rd!").await;

        let (status, _) = app.send(Method::GET, "/api/order/my", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .authed(Method::GET, "/api/order/my", "bestboss", "wrong", None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid credentials");

        let (status, _) = app
            .authed(Method::POST, "/api/order/new", "nobody", "x", Some(&json!([])))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let app = TestApp::new();
        app.register("bestboss", "Pa$$w0rd!").await;

        let (status, _) = app
            .authed(
                Method::POST,
                "/api/order/new",
                "bestboss",
                "Pa$$w0rd!",
                Some(&json!([{ "ice_cream_id": 1, "quantity": 0 }])),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, mine) = app
            .authed(Method::GET, "/api/order/my", "bestboss", "Pa$$w0rd!", None)
            .await;
        assert_eq!(mine, json!([]));
    }

    #[tokio::test]
    async fn test_empty_order_is_accepted() {
        let app = TestApp::new();
        app.register("bestboss", "Pa$$w0rd!").await;

        let (status, order) = app
            .authed(Method::POST, "/api/order/new", "bestboss", "Pa$$w0rd!", Some(&json!([])))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["positions"], json!([]));
    }
}
