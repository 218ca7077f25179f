//! Business operations.
//!
//! Each entity kind gets a service struct borrowing the record store, in the
//! same shape throughout: validate input at the gate, touch the store, then
//! route through the [`aggregates`] maintainer (line items) or the
//! [`cascade`] orchestrator (aggregate-root deletes) where the operation
//! requires it.

pub mod addresses;
pub mod admins;
pub mod aggregates;
pub mod auth;
pub mod carts;
pub mod cascade;
pub mod catalog;
pub mod images;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod wishlists;

use uuid::Uuid;

use crate::error::BackendError;
use crate::store::{Record, Records};

/// Fetch a record or fail with the taxonomy's `NotFound` for its kind.
pub(crate) async fn fetch_required<R: Record>(
    records: Records<'_>,
    id: impl Into<Uuid>,
) -> Result<R, BackendError> {
    let id: Uuid = id.into();
    records.find::<R>(id).await?.ok_or(BackendError::NotFound {
        kind: R::KIND.as_str(),
    })
}
