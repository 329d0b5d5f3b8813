//! User repository for database operations.
//!
//! Passwords are hashed here, before they reach any query, so no code path
//! can persist a plaintext password.

use sqlx::PgPool;

use tinystore_core::UserId;

use super::RepositoryError;
use crate::models::user::{NewUser, User};
use crate::services::auth::PasswordHasher;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
    hasher: &'a PasswordHasher,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool, hasher: &'a PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, password_hash
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, password_hash
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Create a new user, hashing the password first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Hashing` if the password cannot be hashed.
    /// Returns `RepositoryError::Database` for database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let password_hash = self.hash(user).await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (first_name, last_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, password_hash
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&password_hash)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace a user's profile and password.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Hashing` if the password cannot be hashed.
    /// Returns `RepositoryError::Database` for database errors.
    pub async fn update(&self, id: UserId, user: &NewUser) -> Result<Option<User>, RepositoryError> {
        let password_hash = self.hash(user).await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET first_name = $1, last_name = $2, password_hash = $3
            WHERE id = $4
            RETURNING id, first_name, last_name, password_hash
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&password_hash)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Delete a user. Their orders and line items go with them.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Authenticate by first name and password.
    ///
    /// First names are not unique; the lowest-id match is the only candidate.
    /// Returns `None` when no user matches or the password is wrong.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn authenticate(
        &self,
        first_name: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, password_hash
            FROM users
            WHERE first_name = $1
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(first_name)
        .fetch_optional(self.pool)
        .await?;

        let Some(user) = row.map(User::from) else {
            return Ok(None);
        };
        let verified = self
            .hasher
            .spawn_verify(password, &user.password_hash)
            .await
            .map_err(|_| RepositoryError::Hashing)?;

        Ok(verified.then_some(user))
    }

    async fn hash(&self, user: &NewUser) -> Result<String, RepositoryError> {
        self.hasher
            .spawn_hash(&user.password)
            .await
            .map_err(|_| RepositoryError::Hashing)
    }
}
