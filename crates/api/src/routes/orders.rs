//! Order route handlers.
//!
//! Every order route needs a bearer token. Path IDs are validated before the
//! body, and both before any storage access.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use tinystore_core::{OrderId, OrderStatusError, ProductId, UserId};

use super::{JsonBody, decode, require_fields};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{Order, OrderItem, OrderWithProducts};
use crate::services::orders::OrderService;
use crate::state::AppState;

const QUANTITY_MESSAGE: &str = "Quantity must be a positive number";

/// Body for opening an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderPayload {
    pub user_id: UserId,
}

/// Open a new `active` order for a user.
pub async fn create(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<(StatusCode, Json<Order>)> {
    require_fields(&payload, &["user_id"])?;
    let CreateOrderPayload { user_id } = decode(payload)?;

    let order = OrderService::new(state.pool()).create(user_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order with its line items.
pub async fn show(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderWithProducts>> {
    let id = OrderId::parse(Some(&id))?;

    OrderService::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order not found"))
}

/// Add a product to an active order.
pub async fn add_product(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<(StatusCode, Json<OrderItem>)> {
    let order_id = OrderId::parse(Some(&id))?;
    require_fields(&payload, &["product_id", "quantity"])?;

    let quantity = payload["quantity"]
        .as_i64()
        .and_then(|q| i32::try_from(q).ok())
        .ok_or_else(|| AppError::validation(QUANTITY_MESSAGE))?;
    let product_id: ProductId = decode(payload["product_id"].clone())?;

    let item = OrderService::new(state.pool())
        .add_item(order_id, product_id, quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set an order's status.
pub async fn update_status(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<Order>> {
    let order_id = OrderId::parse(Some(&id))?;
    require_fields(&payload, &["status"])?;

    let status = payload["status"]
        .as_str()
        .ok_or_else(|| AppError::validation(OrderStatusError.to_string()))?;

    OrderService::new(state.pool())
        .update_status(order_id, status)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order not found"))
}

/// Get the user's active order.
pub async fn current(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<OrderWithProducts>> {
    let user_id = UserId::parse(Some(&user_id))?;

    OrderService::new(state.pool())
        .current_for_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("No active order found for this user"))
}

/// Get the user's completed orders, newest first.
pub async fn completed(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderWithProducts>>> {
    let user_id = UserId::parse(Some(&user_id))?;

    let orders = OrderService::new(state.pool())
        .completed_for_user(user_id)
        .await?;
    Ok(Json(orders))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::TestApp;

    #[tokio::test]
    async fn test_order_routes_require_token() {
        let app = TestApp::new();
        for (method, uri) in [
            (Method::POST, "/api/orders"),
            (Method::GET, "/api/orders/1"),
            (Method::POST, "/api/orders/1/products"),
            (Method::PUT, "/api/orders/1"),
            (Method::GET, "/api/orders/user/1/current"),
            (Method::GET, "/api/orders/user/1/completed"),
        ] {
            let (status, _) = app.request(method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_create_requires_user_id() {
        let app = TestApp::new();
        let token = app.token();
        let (status, body) = app
            .request(Method::POST, "/api/orders", Some(&token), Some(json!({})))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required field: user_id");
    }

    #[tokio::test]
    async fn test_add_product_validation() {
        let app = TestApp::new();
        let token = app.token();

        let (status, body) = app
            .request(
                Method::POST,
                "/api/orders/abc/products",
                Some(&token),
                Some(json!({"product_id": 1, "quantity": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid order id");

        let (status, body) = app
            .request(
                Method::POST,
                "/api/orders/1/products",
                Some(&token),
                Some(json!({"product_id": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required fields: product_id, quantity");

        for quantity in [json!(-2), json!("3"), json!(1.5)] {
            let (status, body) = app
                .request(
                    Method::POST,
                    "/api/orders/1/products",
                    Some(&token),
                    Some(json!({"product_id": 1, "quantity": quantity})),
                )
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Quantity must be a positive number");
        }
    }

    #[tokio::test]
    async fn test_update_status_validation() {
        let app = TestApp::new();
        let token = app.token();

        let (status, body) = app
            .request(Method::PUT, "/api/orders/1", Some(&token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required field: status");

        let (status, body) = app
            .request(
                Method::PUT,
                "/api/orders/1",
                Some(&token),
                Some(json!({"status": "invalid"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Status must be either 'active' or 'complete'"
        );
    }

    #[tokio::test]
    async fn test_user_scoped_routes_reject_malformed_user_id() {
        let app = TestApp::new();
        let token = app.token();

        for uri in ["/api/orders/user/x/current", "/api/orders/user/x/completed"] {
            let (status, body) = app.request(Method::GET, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["message"], "Invalid user id");
        }
    }
}
