//! User domain types.

use secrecy::SecretString;
use serde::Serialize;

use tinystore_core::UserId;

/// A registered user (domain type).
///
/// Serializes as `{id, firstName, lastName}`. The password hash is kept for
/// verification but never leaves the server.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Given name; also the login handle.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Peppered Argon2 PHC string.
    #[serde(skip)]
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Fields for creating or replacing a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    /// Plaintext password; hashed by the repository before it is stored.
    pub password: SecretString,
}
