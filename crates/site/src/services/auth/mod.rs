//! Authentication service.
//!
//! Email and password sign-up and sign-in. Passwords are hashed with argon2.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use folio_core::Email;

use crate::db::{IdentityStore, RepositoryError};
use crate::models::Identity;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash verified against when the email is unknown, so a miss costs the same
/// argon2 work as a wrong password.
static UNKNOWN_IDENTITY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("folio-unknown-identity").ok());

/// Authentication service over an identity store.
pub struct AuthService<'a, S> {
    identities: &'a S,
}

impl<'a, S: IdentityStore> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identities: &'a S) -> Self {
        Self { identities }
    }

    /// Register a new identity with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::IdentityAlreadyExists` if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email.trim())?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.identities
            .create_identity(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::IdentityAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email.trim())?;

        let Some((identity, password_hash)) = self.identities.credentials_by_email(&email).await?
        else {
            if let Some(hash) = UNKNOWN_IDENTITY_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(identity)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let identity = auth.register("owner@example.com", "hunter2hunter2").await.unwrap();
        let signed_in = auth.login("owner@example.com", "hunter2hunter2").await.unwrap();
        assert_eq!(identity.id, signed_in.id);

        assert!(matches!(
            auth.login("owner@example.com", "not the password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "hunter2hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_identity_hash_is_verifiable() {
        let hash = UNKNOWN_IDENTITY_HASH.as_deref().unwrap();
        assert!(PasswordHash::new(hash).is_ok());
        assert!(matches!(
            verify_password("hunter2hunter2", hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register("owner@example.com", "hunter2hunter2").await.unwrap();
        assert!(matches!(
            auth.register("owner@example.com", "another-password").await,
            Err(AuthError::IdentityAlreadyExists)
        ));
    }
}
