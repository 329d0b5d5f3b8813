//! User route handlers.
//!
//! Registration and login are public; everything else needs a bearer token.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use tinystore_core::UserId;

use super::{JsonBody, decode, require_fields};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::user::{NewUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

const USER_FIELDS: &[&str] = &["firstName", "lastName", "password"];
const LOGIN_FIELDS: &[&str] = &["firstName", "password"];

// =============================================================================
// Request/Response Types
// =============================================================================

/// Body for registration and profile replacement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl From<UserPayload> for NewUser {
    fn from(payload: UserPayload) -> Self {
        Self {
            first_name: payload.first_name,
            last_name: payload.last_name,
            password: SecretString::from(payload.password),
        }
    }
}

/// Login body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub first_name: String,
    pub password: String,
}

/// A freshly registered user with their token.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<(StatusCode, Json<RegisteredUser>)> {
    require_fields(&payload, USER_FIELDS)?;
    let new_user: NewUser = decode::<UserPayload>(payload)?.into();

    let auth = AuthService::new(state.pool(), state.hasher(), state.tokens());
    let (user, token) = auth.register(&new_user).await?;

    Ok((StatusCode::CREATED, Json(RegisteredUser { user, token })))
}

/// Login with first name and password.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<LoginResponse>> {
    require_fields(&payload, LOGIN_FIELDS)?;
    let login: LoginPayload = decode(payload)?;

    let auth = AuthService::new(state.pool(), state.hasher(), state.tokens());
    let (user, token) = auth.login(&login.first_name, &login.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        user,
        token,
    }))
}

/// List all users.
pub async fn index(_auth: RequireAuth, State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool(), state.hasher())
        .list_all()
        .await?;
    Ok(Json(users))
}

/// Get a user by ID.
pub async fn show(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id = UserId::parse(Some(&id))?;

    UserRepository::new(state.pool(), state.hasher())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Replace a user's profile and password.
pub async fn update(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<User>> {
    let id = UserId::parse(Some(&id))?;
    require_fields(&payload, USER_FIELDS)?;
    let user: NewUser = decode::<UserPayload>(payload)?.into();

    AuthService::new(state.pool(), state.hasher(), state.tokens())
        .update(id, &user)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Delete a user along with their orders.
pub async fn delete(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = UserId::parse(Some(&id))?;

    let deleted = UserRepository::new(state.pool(), state.hasher())
        .delete(id)
        .await?;
    if !deleted {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(json!({ "message": "User deleted" })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{TestApp, token_for};

    #[tokio::test]
    async fn test_register_missing_fields() {
        let app = TestApp::new();
        let (status, body) = app
            .request(
                Method::POST,
                "/api/users",
                None,
                Some(json!({"firstName": "Updated", "password": "new_password"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Missing required fields: firstName, lastName, password"
        );
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let app = TestApp::new();
        let (status, body) = app
            .request(
                Method::POST,
                "/api/users",
                None,
                Some(json!({"firstName": "Alice", "lastName": "Smith", "password": "1234"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Password must be at least 6 characters long");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = TestApp::new();
        let (status, body) = app
            .request(
                Method::POST,
                "/api/users/login",
                None,
                Some(json!({"firstName": "Alice"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required fields: firstName, password");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = TestApp::new();
        for (method, uri) in [
            (Method::GET, "/api/users"),
            (Method::GET, "/api/users/1"),
            (Method::PUT, "/api/users/1"),
            (Method::DELETE, "/api/users/1"),
        ] {
            let (status, body) = app.request(method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_forged_token_rejected() {
        let app = TestApp::new();
        let forged = token_for(&crate::routes::testing::other_issuer());

        let (status, _) = app
            .request(Method::GET, "/api/users", Some(&forged), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let app = TestApp::new();
        let token = app.token();

        for uri in ["/api/users/abc", "/api/users/-1", "/api/users/1.5"] {
            let (status, body) = app.request(Method::GET, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["message"], "Invalid user id");
        }
    }
}
