//! Administrator account operations.
//!
//! Admins are not aggregate roots: nothing in the catalog references an
//! admin, so deletion is a plain record delete with no cascade.

use chrono::Utc;
use serde_json::{Map, Value};

use copperleaf_core::{AdminId, Email};

use super::{auth, fetch_required, images};
use crate::error::BackendError;
use crate::models::Admin;
use crate::store::{Filter, RecordStore, Records};
use crate::validate::{self, MAX_TEXT_LENGTH, ValidationError};

/// Input for creating an administrator account.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateAdminInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CreateAdminInput {
    fn validate(&self) -> Result<Email, ValidationError> {
        validate::require_text("username", &self.username, MAX_TEXT_LENGTH)?;
        validate::require_password(&self.password)?;
        Ok(Email::parse(&self.email)?)
    }
}

/// Administrator account service.
pub struct AdminService<'a> {
    records: Records<'a>,
}

impl<'a> AdminService<'a> {
    /// Create an admin service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    /// Create an administrator account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input and `Conflict` if the email
    /// is already registered.
    pub async fn create(&self, input: CreateAdminInput) -> Result<Admin, BackendError> {
        let email = input.validate()?;

        if self
            .records
            .find_first::<Admin>(&Filter::field("email", &email))
            .await?
            .is_some()
        {
            return Err(BackendError::Conflict(format!(
                "email {email} is already registered"
            )));
        }

        let admin = Admin {
            id: AdminId::generate(),
            username: input.username,
            email,
            credential_hash: auth::hash_password(&input.password)?,
            image_url: images::USER_IMAGE_PLACEHOLDER.to_owned(),
            last_login: None,
            created_at: Utc::now(),
        };
        self.records.create(&admin).await?;

        tracing::info!(admin_id = %admin.id, "admin created");
        Ok(admin)
    }

    /// Update the username.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed username, `NotFound` if absent.
    pub async fn update(&self, id: AdminId, username: String) -> Result<Admin, BackendError> {
        validate::require_text("username", &username, MAX_TEXT_LENGTH)?;
        let mut patch = Map::new();
        patch.insert("username".to_owned(), Value::String(username));
        self.records
            .update::<Admin>(id, Value::Object(patch))
            .await?
            .ok_or(BackendError::not_found("admin"))
    }

    /// Fetch an admin by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: AdminId) -> Result<Admin, BackendError> {
        fetch_required(self.records, id).await
    }

    /// Fetch an admin by email, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, BackendError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        Ok(self
            .records
            .find_first::<Admin>(&Filter::field("email", &email))
            .await?)
    }

    /// All admins.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self) -> Result<Vec<Admin>, BackendError> {
        Ok(self.records.find_many(&Filter::all()).await?)
    }

    /// Delete an admin.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn delete(&self, id: AdminId) -> Result<Admin, BackendError> {
        self.records
            .delete::<Admin>(id)
            .await?
            .ok_or(BackendError::not_found("admin"))
    }

    /// Delete every admin.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, BackendError> {
        Ok(self.records.delete_many::<Admin>(&Filter::all()).await?)
    }
}
