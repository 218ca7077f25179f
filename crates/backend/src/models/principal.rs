//! Principal records and their addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperleaf_core::{AddressId, AdminId, Email, UserId};

use super::impl_record;

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Unique across users (enforced by a creation precheck, not the store).
    pub email: Email,
    /// Argon2id PHC string; never the raw password.
    pub credential_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An administrator account, kept fully separate from customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub email: Email,
    pub credential_hash: String,
    pub image_url: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A shipping/billing address belonging to one user.
///
/// At most one address per user carries `default = true`; the aggregate
/// maintainer's unset-all pass enforces this on every default write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(rename = "default")]
    pub is_default: bool,
}

impl_record!(User, User);
impl_record!(Admin, Admin);
impl_record!(Address, Address);
