//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /health/ready                        - Readiness check (database)
//!
//! # Users
//! POST   /api/users                           - Register (auth rate limit)
//! POST   /api/users/login                     - Login (auth rate limit)
//! GET    /api/users                           - List users (bearer)
//! GET    /api/users/{id}                      - Get user (bearer)
//! PUT    /api/users/{id}                      - Replace user (bearer)
//! DELETE /api/users/{id}                      - Delete user (bearer)
//!
//! # Products
//! GET    /api/products                        - List products
//! GET    /api/products/id/{id}                - Get product
//! GET    /api/products/category/{category}    - List products in a category
//! POST   /api/products                        - Create product (bearer)
//!
//! # Orders (all bearer)
//! POST   /api/orders                          - Open an order
//! GET    /api/orders/{id}                     - Order with line items
//! POST   /api/orders/{id}/products            - Add a line item
//! PUT    /api/orders/{id}                     - Set status
//! GET    /api/orders/user/{userId}/current    - User's active order
//! GET    /api/orders/user/{userId}/completed  - User's completed orders
//! ```

pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    body::Body,
    extract::{FromRequest, State},
    http::{Request, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use tinystore_core::missing_fields;

use crate::error::AppError;
use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, json_rate_limit_response, request_id_middleware,
};
use crate::state::AppState;

/// Create the user routes router.
///
/// Registration and login get the strict auth limiter when `rate_limit` is on.
pub fn user_routes(rate_limit: bool) -> Router<AppState> {
    let mut public = Router::new()
        .route("/", post(users::create))
        .route("/login", post(users::login));
    if rate_limit {
        public = public.layer(auth_rate_limiter());
    }

    let protected = Router::new().route("/", get(users::index)).route(
        "/{id}",
        get(users::show).put(users::update).delete(users::delete),
    );

    public.merge(protected)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/id/{id}", get(products::show))
        .route("/category/{category}", get(products::by_category))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{id}", get(orders::show).put(orders::update_status))
        .route("/{id}/products", post(orders::add_product))
        .route("/user/{user_id}/current", get(orders::current))
        .route("/user/{user_id}/completed", get(orders::completed))
}

/// Create all `/api` routes.
pub fn api_routes(rate_limit: bool) -> Router<AppState> {
    let api = Router::new()
        .nest("/users", user_routes(rate_limit))
        .nest("/products", product_routes())
        .nest("/orders", order_routes());

    if rate_limit {
        api.layer(api_rate_limiter())
    } else {
        api
    }
}

/// Build the complete application router.
///
/// Sentry layers are added by the binary; everything else (tracing, request
/// IDs, rate limiting) is part of the router so tests exercise it too.
pub fn app(state: AppState) -> Router {
    let rate_limit = state.config().rate_limit;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes(rate_limit))
        .layer(axum_middleware::map_response(json_rate_limit_response))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// =============================================================================
// Request Body Helpers
// =============================================================================

/// JSON body extractor whose rejections use the API's `{"message"}` shape.
///
/// Malformed JSON and a missing `Content-Type` become `AppError::Validation`
/// instead of axum's plain-text rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Reject the payload if any required field is missing or falsy.
///
/// The error message names every required field, not only the missing ones.
pub(crate) fn require_fields(payload: &Value, fields: &[&str]) -> Result<(), AppError> {
    if missing_fields(payload, fields).is_empty() {
        Ok(())
    } else {
        Err(AppError::missing_fields(fields))
    }
}

/// Deserialize a checked payload into its typed request.
pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
}

/// Router harness for handler tests.
///
/// The pool points at an unreachable address, so only paths that fail before
/// touching the database are testable here; database paths live in the
/// integration tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use std::time::Duration;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use secrecy::SecretString;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use tinystore_core::UserId;

    use crate::config::{ApiConfig, PasswordConfig, TokenConfig};
    use crate::models::User;
    use crate::services::auth::TokenIssuer;
    use crate::state::AppState;

    const UNREACHABLE_DB: &str = "postgres://nobody@127.0.0.1:1/none";

    pub struct TestApp {
        router: Router,
        state: AppState,
    }

    impl TestApp {
        pub fn new() -> Self {
            let config = ApiConfig {
                database_url: SecretString::from(UNREACHABLE_DB),
                host: [127, 0, 0, 1].into(),
                port: 0,
                password: PasswordConfig {
                    pepper: SecretString::from("test-pepper"),
                    cost: 1,
                },
                token: TokenConfig {
                    secret: SecretString::from("router-test-secret-with-enough-length"),
                    expires_in: Duration::from_secs(3600),
                },
                rate_limit: false,
                sentry_dsn: None,
                sentry_environment: None,
            };
            let pool = PgPoolOptions::new()
                .acquire_timeout(Duration::from_millis(50))
                .connect_lazy(UNREACHABLE_DB)
                .unwrap();
            let state = AppState::new(config, pool).unwrap();

            Self {
                router: super::app(state.clone()),
                state,
            }
        }

        /// The router under test.
        pub fn router(&self) -> Router {
            self.router.clone()
        }

        /// A valid token for user 1.
        pub fn token(&self) -> String {
            token_for(self.state.tokens())
        }

        pub async fn request(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

            (status, body)
        }
    }

    /// Sign a token for a fixed user with `issuer`.
    pub fn token_for(issuer: &TokenIssuer) -> String {
        let user = User {
            id: UserId::new(1),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            password_hash: String::new(),
        };
        issuer.issue(&user).unwrap()
    }

    /// An issuer whose tokens the test app must reject.
    pub fn other_issuer() -> TokenIssuer {
        TokenIssuer::new(b"some-other-secret-nobody-configured", Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_require_fields_lists_all_required() {
        let err = require_fields(
            &json!({"firstName": "Updated", "password": "new_password"}),
            &["firstName", "lastName", "password"],
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required fields: firstName, lastName, password"
        );
    }

    #[test]
    fn test_require_fields_accepts_complete_payload() {
        assert!(require_fields(&json!({"user_id": 3}), &["user_id"]).is_ok());
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = testing::TestApp::new();
        let (status, body) = app
            .request(axum::http::Method::GET, "/health", None, None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let app = testing::TestApp::new();
        let (status, _) = app
            .request(axum::http::Method::GET, "/health/ready", None, None)
            .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = testing::TestApp::new();
        let (status, _) = app
            .request(axum::http::Method::GET, "/api/nothing-here", None, None)
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_json_gets_message_body() {
        use axum::body::to_bytes;
        use tower::ServiceExt;

        let app = testing::TestApp::new();
        let request = Request::builder()
            .method(axum::http::Method::POST)
            .uri("/api/users/login")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"firstName\": "))
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_missing_content_type_gets_message_body() {
        use axum::body::to_bytes;
        use tower::ServiceExt;

        let app = testing::TestApp::new();
        let request = Request::builder()
            .method(axum::http::Method::POST)
            .uri("/api/users")
            .body(Body::from(
                json!({"firstName": "Alice", "lastName": "Smith", "password": "secret1"})
                    .to_string(),
            ))
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("Content-Type")
        );
    }

    #[test]
    fn test_decode_reports_type_errors_as_validation() {
        #[derive(Debug, serde::Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            user_id: i32,
        }

        let err = decode::<Payload>(json!({"user_id": "three"})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
