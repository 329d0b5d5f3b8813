//! Authentication service.
//!
//! Password registration and login, plus bearer token issuance.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use token::{Claims, TokenIssuer};

use secrecy::ExposeSecret;
use sqlx::PgPool;

use tinystore_core::UserId;

use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
///
/// Handles registration, login and profile replacement. Every path that
/// stores a password runs it through [`validate_password`] first.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hasher: &'a PasswordHasher, tokens: &'a TokenIssuer) -> Self {
        Self {
            users: UserRepository::new(pool, hasher),
            tokens,
        }
    }

    /// Register a new user and issue their first token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Repository` if the user cannot be stored.
    pub async fn register(&self, user: &NewUser) -> Result<(User, String), AuthError> {
        validate_password(user.password.expose_secret())?;

        let user = self.users.create(user).await?;
        let token = self.tokens.issue(&user)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, token))
    }

    /// Login with first name and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no user matches or the
    /// password is wrong.
    pub async fn login(&self, first_name: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .users
            .authenticate(first_name, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.tokens.issue(&user)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    /// Replace a user's profile and password.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn update(&self, id: UserId, user: &NewUser) -> Result<Option<User>, AuthError> {
        validate_password(user.password.expose_secret())?;

        Ok(self.users.update(id, user).await?)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        let err = validate_password("1234").unwrap_err();
        assert!(matches!(
            err,
            AuthError::WeakPassword(ref msg) if msg == "Password must be at least 6 characters long"
        ));
    }

    #[test]
    fn test_six_characters_accepted() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("hashed_password_123").is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // five characters, ten bytes
        assert!(validate_password("ééééé").is_err());
    }
}
