//! Address operations.
//!
//! Addresses are children of users, never cascade roots. The one invariant
//! they carry — at most one default address per user — is enforced by an
//! unset-all pass before every default write.

use serde_json::{Map, Value};

use copperleaf_core::{AddressId, UserId};

use super::aggregates::AggregateMaintainer;
use super::fetch_required;
use crate::error::BackendError;
use crate::models::{Address, User};
use crate::store::{Filter, RecordStore, Records};
use crate::validate::{self, MAX_TEXT_LENGTH};

/// Input for creating an address.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateAddressInput {
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, rename = "default")]
    pub is_default: bool,
}

impl CreateAddressInput {
    fn validate(&self) -> Result<(), crate::validate::ValidationError> {
        validate::require_text("street", &self.street, MAX_TEXT_LENGTH)?;
        validate::require_text("city", &self.city, MAX_TEXT_LENGTH)?;
        validate::require_text("postal_code", &self.postal_code, MAX_TEXT_LENGTH)?;
        validate::require_text("country", &self.country, MAX_TEXT_LENGTH)?;
        Ok(())
    }
}

/// Input for updating an address. Absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateAddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "default")]
    pub is_default: Option<bool>,
}

/// Address service.
pub struct AddressService<'a> {
    store: &'a dyn RecordStore,
    records: Records<'a>,
}

impl<'a> AddressService<'a> {
    /// Create an address service.
    #[must_use]
    pub const fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            records: Records::new(store),
        }
    }

    /// Create an address for an existing user.
    ///
    /// A default address first unsets every other default of the same user
    /// (unset-all, then set-one; the two writes are not atomic).
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` if the user is
    /// absent.
    pub async fn create(&self, input: CreateAddressInput) -> Result<Address, BackendError> {
        input.validate()?;
        let _: User = fetch_required(self.records, input.user_id).await?;

        if input.is_default {
            AggregateMaintainer::new(self.store)
                .clear_other_defaults(input.user_id, None)
                .await?;
        }

        let address = Address {
            id: AddressId::generate(),
            user_id: input.user_id,
            street: input.street,
            city: input.city,
            postal_code: input.postal_code,
            country: input.country,
            is_default: input.is_default,
        };
        self.records.create(&address).await?;
        Ok(address)
    }

    /// Update address fields, with the same default-exclusivity pass as
    /// [`create`](Self::create) when `default` is being set.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed fields, `NotFound` if absent.
    pub async fn update(
        &self,
        id: AddressId,
        input: UpdateAddressInput,
    ) -> Result<Address, BackendError> {
        let current: Address = fetch_required(self.records, id).await?;

        let mut patch = Map::new();
        for (field, value) in [
            ("street", input.street),
            ("city", input.city),
            ("postal_code", input.postal_code),
            ("country", input.country),
        ] {
            if let Some(value) = value {
                validate::require_text(field, &value, MAX_TEXT_LENGTH)?;
                patch.insert(field.to_owned(), Value::String(value));
            }
        }
        if let Some(is_default) = input.is_default {
            if is_default {
                AggregateMaintainer::new(self.store)
                    .clear_other_defaults(current.user_id, Some(id))
                    .await?;
            }
            patch.insert("default".to_owned(), Value::Bool(is_default));
        }
        if patch.is_empty() {
            return Ok(current);
        }

        self.records
            .update::<Address>(id, Value::Object(patch))
            .await?
            .ok_or(BackendError::not_found("address"))
    }

    /// Fetch an address by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn find_by_id(&self, id: AddressId) -> Result<Address, BackendError> {
        fetch_required(self.records, id).await
    }

    /// All addresses of one user.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, BackendError> {
        Ok(self
            .records
            .find_many(&Filter::field("user_id", user_id))
            .await?)
    }

    /// Delete an address. A child delete: the owning user is untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn delete(&self, id: AddressId) -> Result<Address, BackendError> {
        self.records
            .delete::<Address>(id)
            .await?
            .ok_or(BackendError::not_found("address"))
    }

    /// Delete every address.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, BackendError> {
        Ok(self.records.delete_many::<Address>(&Filter::all()).await?)
    }
}
