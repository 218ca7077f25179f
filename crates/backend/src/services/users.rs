//! Customer account operations.

use chrono::Utc;
use serde_json::{Map, Value};

use copperleaf_core::{Email, UserId};

use super::cascade::{CascadeOrchestrator, RootKind};
use super::{auth, fetch_required, images};
use crate::error::BackendError;
use crate::models::User;
use crate::store::{Filter, RecordStore, Records};
use crate::validate::{self, MAX_TEXT_LENGTH, ValidationError};

/// Input for creating a customer account.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl CreateUserInput {
    fn validate(&self) -> Result<Email, ValidationError> {
        validate::require_text("username", &self.username, MAX_TEXT_LENGTH)?;
        validate::require_password(&self.password)?;
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
        ] {
            if let Some(value) = value {
                validate::require_text(field, value, MAX_TEXT_LENGTH)?;
            }
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Input for updating a customer account. Absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Customer account service.
pub struct UserService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> UserService<'a> {
    /// Create a user service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input and `Conflict` if the email
    /// is already registered.
    pub async fn create(&self, input: CreateUserInput) -> Result<User, BackendError> {
        let email = input.validate()?;

        // The document store has no unique constraints; uniqueness is a
        // precheck here.
        if self
            .records
            .find_first::<User>(&Filter::field("email", &email))
            .await?
            .is_some()
        {
            return Err(BackendError::Conflict(format!(
                "email {email} is already registered"
            )));
        }

        let user = User {
            id: UserId::generate(),
            username: input.username,
            email,
            credential_hash: auth::hash_password(&input.password)?,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            image_url: images::USER_IMAGE_PLACEHOLDER.to_owned(),
            last_login: None,
            created_at: Utc::now(),
        };
        self.records.create(&user).await?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed fields, `NotFound` if the user is
    /// absent.
    pub async fn update(&self, id: UserId, input: UpdateUserInput) -> Result<User, BackendError> {
        let mut patch = Map::new();
        for (field, value) in [
            ("username", input.username),
            ("first_name", input.first_name),
            ("last_name", input.last_name),
            ("phone", input.phone),
        ] {
            if let Some(value) = value {
                validate::require_text(field, &value, MAX_TEXT_LENGTH)?;
                patch.insert(field.to_owned(), Value::String(value));
            }
        }
        if patch.is_empty() {
            return fetch_required(self.records, id).await;
        }

        self.records
            .update::<User>(id, Value::Object(patch))
            .await?
            .ok_or(BackendError::not_found("user"))
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: UserId) -> Result<User, BackendError> {
        fetch_required(self.records, id).await
    }

    /// Fetch a user by email, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        Ok(self
            .records
            .find_first::<User>(&Filter::field("email", &email))
            .await?)
    }

    /// All users.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, BackendError> {
        Ok(self.records.find_many(&Filter::all()).await?)
    }

    /// Delete a user and the user's full dependent subtree.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` via the cascade's root check, or `Cascade` naming
    /// the failed stage.
    pub async fn delete(&self, id: UserId) -> Result<User, BackendError> {
        Ok(CascadeOrchestrator::new(self.store).delete_user(id).await?)
    }

    /// Delete every user and every user-owned record.
    ///
    /// # Errors
    ///
    /// Returns `Cascade` naming the failed stage.
    pub async fn delete_all(&self) -> Result<(), BackendError> {
        Ok(CascadeOrchestrator::new(self.store)
            .delete_all(RootKind::User)
            .await?)
    }
}
