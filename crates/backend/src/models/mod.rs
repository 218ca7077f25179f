//! Entity models persisted through the record store.
//!
//! Every struct here is a plain serde document; the store keys it by
//! [`RecordKind`](crate::store::RecordKind) and id. Derived fields
//! (`items_count`, `total_price`) are stored denormalized and kept honest by
//! the aggregate maintainer, not by the store.

pub mod catalog;
pub mod principal;
pub mod shopping;

pub use catalog::{Brand, Category, Product, Review};
pub use principal::{Address, Admin, User};
pub use shopping::{Cart, CartItem, Order, OrderItem, WishList, WishListItem};

/// Wire an entity struct to its store kind.
macro_rules! impl_record {
    ($ty:ty, $kind:ident) => {
        impl $crate::store::Record for $ty {
            const KIND: $crate::store::RecordKind = $crate::store::RecordKind::$kind;

            fn record_id(&self) -> ::uuid::Uuid {
                self.id.as_uuid()
            }
        }
    };
}

pub(crate) use impl_record;
