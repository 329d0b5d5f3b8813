//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! ts-cli user create --first-name Alice --last-name Smith --password 's3cret-pass'
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PASSWORD_PEPPER` - Must match the API server's pepper
//! - `PASSWORD_HASH_COST` - Optional Argon2 iteration count

use secrecy::SecretString;
use thiserror::Error;

use tinystore_api::config::{ConfigError, PasswordConfig, get_database_url};
use tinystore_api::db::{self, RepositoryError, UserRepository};
use tinystore_api::models::NewUser;
use tinystore_api::services::auth::{AuthError, PasswordHasher, validate_password};
use tinystore_core::UserId;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserCommandError {
    /// Configuration error (database URL or pepper).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Weak password or bad hashing parameters.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserCommandError` if configuration is missing, the password is
/// too short, or the insert fails.
pub async fn create(
    first_name: String,
    last_name: String,
    password: String,
) -> Result<UserId, UserCommandError> {
    dotenvy::dotenv().ok();

    validate_password(&password)?;

    let hasher = PasswordHasher::from_config(&PasswordConfig::from_env()?)?;
    let database_url = get_database_url("API_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool, &hasher)
        .create(&NewUser {
            first_name,
            last_name,
            password: SecretString::from(password),
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Name: {} {}",
        user.id,
        user.first_name,
        user.last_name
    );

    Ok(user.id)
}
