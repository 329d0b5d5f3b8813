//! Peppered Argon2id password hashing.
//!
//! Each hash gets a fresh random salt; the server-wide pepper is appended to
//! the password before hashing and is never stored.
//!
//! Argon2 is CPU and memory bound (each hash touches the default 19 MiB, for
//! `cost` passes). Request paths use [`PasswordHasher::spawn_hash`] and
//! [`PasswordHasher::spawn_verify`], which run on tokio's blocking pool so a
//! burst of logins cannot stall the async workers.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use secrecy::{ExposeSecret, SecretString};

use super::AuthError;
use crate::config::PasswordConfig;

/// Hashes and verifies passwords with a server-side pepper.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    pepper: SecretString,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .field("pepper", &"[REDACTED]")
            .finish()
    }
}

impl PasswordHasher {
    /// Create a hasher with the given pepper and cost factor.
    ///
    /// The cost factor is the Argon2 iteration count; memory and lane
    /// settings stay at the Argon2 defaults.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the cost factor is out of range.
    pub fn new(pepper: SecretString, cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|_| AuthError::PasswordHash)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper,
        })
    }

    /// Create a hasher from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the configured cost is out of range.
    pub fn from_config(config: &PasswordConfig) -> Result<Self, AuthError> {
        Self::new(config.pepper.clone(), config.cost)
    }

    /// Hash a plaintext password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash never verifies.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(self.peppered(password).as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// [`Self::hash`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails or the blocking task
    /// is cancelled.
    pub async fn spawn_hash(&self, password: &SecretString) -> Result<String, AuthError> {
        let hasher = self.clone();
        let password = password.clone();

        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|_| AuthError::PasswordHash)?
    }

    /// [`Self::verify`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the blocking task is cancelled.
    pub async fn spawn_verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let password = SecretString::from(password);
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &hash))
            .await
            .map_err(|_| AuthError::PasswordHash)
    }

    fn peppered(&self, password: &str) -> String {
        format!("{password}{}", self.pepper.expose_secret())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher(pepper: &str) -> PasswordHasher {
        PasswordHasher::new(SecretString::from(pepper), 1).unwrap()
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hasher("pepper").hash("password123").unwrap();
        assert_ne!(hash, "password123");
        assert!(!hash.contains("password123"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_round_trip() {
        let hasher = hasher("pepper");
        let hash = hasher.hash("password123").unwrap();
        assert!(hasher.verify("password123", &hash));
        assert!(!hasher.verify("password124", &hash));
    }

    #[test]
    fn test_salt_is_random() {
        let hasher = hasher("pepper");
        let first = hasher.hash("same-password").unwrap();
        let second = hasher.hash("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_pepper_is_required_to_verify() {
        let hash = hasher("pepper-one").hash("password123").unwrap();
        assert!(!hasher("pepper-two").verify("password123", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!hasher("pepper").verify("password123", "not-a-phc-string"));
        assert!(!hasher("pepper").verify("password123", ""));
    }

    #[test]
    fn test_cost_is_applied() {
        let hash = PasswordHasher::new(SecretString::from("pepper"), 3)
            .unwrap()
            .hash("password123")
            .unwrap();
        assert!(hash.contains("t=3"));
    }

    #[test]
    fn test_zero_cost_rejected() {
        assert!(PasswordHasher::new(SecretString::from("pepper"), 0).is_err());
    }

    #[tokio::test]
    async fn test_spawned_hash_and_verify() {
        let hasher = hasher("pepper");
        let hash = hasher
            .spawn_hash(&SecretString::from("password123"))
            .await
            .unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.spawn_verify("password123", &hash).await.unwrap());
        assert!(!hasher.spawn_verify("password124", &hash).await.unwrap());
        assert!(!hasher.spawn_verify("password123", "garbage").await.unwrap());
    }

    #[test]
    fn test_debug_redacts_pepper() {
        let output = format!("{:?}", hasher("very-secret-pepper"));
        assert!(!output.contains("very-secret-pepper"));
    }
}
