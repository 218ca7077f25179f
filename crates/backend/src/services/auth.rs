//! Authentication.
//!
//! Password credentials are Argon2id PHC strings. Login failures are
//! deliberately generic: an unknown email and a wrong password both surface
//! as the same `AuthFailed`, never revealing which half was wrong.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde_json::json;

use copperleaf_core::{AdminId, Email, UserId};

use crate::error::BackendError;
use crate::models::{Admin, User};
use crate::store::{Filter, RecordStore, Records};
use crate::validate::ValidationError;

/// Authentication service for both principal kinds.
pub struct AuthService<'a> {
    records: Records<'a>,
}

impl<'a> AuthService<'a> {
    /// Create an authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    /// Log a customer in with email and password.
    ///
    /// Stamps `last_login` on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailed` if the email is unknown or the password is wrong
    /// (indistinguishable by design), or `Validation` for a structurally
    /// invalid email.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<UserId, BackendError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;

        let user = self
            .records
            .find_first::<User>(&Filter::field("email", &email))
            .await?
            .ok_or(BackendError::AuthFailed)?;

        verify_password(password, &user.credential_hash)?;

        self.records
            .update::<User>(user.id, json!({"last_login": Utc::now()}))
            .await?;

        tracing::info!(user_id = %user.id, "customer login");
        Ok(user.id)
    }

    /// Log an administrator in with email and password.
    ///
    /// # Errors
    ///
    /// Same contract as [`login_user`](Self::login_user).
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<AdminId, BackendError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;

        let admin = self
            .records
            .find_first::<Admin>(&Filter::field("email", &email))
            .await?
            .ok_or(BackendError::AuthFailed)?;

        verify_password(password, &admin.credential_hash)?;

        self.records
            .update::<Admin>(admin.id, json!({"last_login": Utc::now()}))
            .await?;

        tracing::info!(admin_id = %admin.id, "admin login");
        Ok(admin.id)
    }
}

/// Hash a password to an Argon2id PHC string.
///
/// # Errors
///
/// Returns `Internal` if the hashing backend fails.
pub(crate) fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BackendError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC string.
///
/// An unparseable stored hash fails like a wrong password: the caller must
/// not be able to distinguish corrupt credentials from bad ones.
fn verify_password(password: &str, stored: &str) -> Result<(), BackendError> {
    let parsed = PasswordHash::new(stored).map_err(|_| BackendError::AuthFailed)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| BackendError::AuthFailed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(BackendError::AuthFailed)
        ));
    }

    #[test]
    fn test_corrupt_hash_fails_generically() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(BackendError::AuthFailed)
        ));
    }
}
