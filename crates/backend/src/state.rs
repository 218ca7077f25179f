//! Backend state shared across operations.
//!
//! [`Backend`] wires the two external collaborators and the session secret
//! together and hands out per-request service values. It is cheaply
//! cloneable via `Arc`; the services themselves are lightweight borrows.

use std::sync::Arc;

use crate::blob::BlobStore;
use crate::config::BackendConfig;
use crate::services::addresses::AddressService;
use crate::services::admins::AdminService;
use crate::services::aggregates::AggregateMaintainer;
use crate::services::auth::AuthService;
use crate::services::carts::CartService;
use crate::services::cascade::CascadeOrchestrator;
use crate::services::catalog::{BrandService, CategoryService, ProductService};
use crate::services::images::ImageService;
use crate::services::orders::OrderService;
use crate::services::reviews::ReviewService;
use crate::services::users::UserService;
use crate::services::wishlists::WishListService;
use crate::session::{SessionCodec, SessionResolver, SessionStore};
use crate::store::RecordStore;

/// Shared backend state.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    store: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    codec: SessionCodec,
    secure_cookies: bool,
}

impl Backend {
    /// Assemble the backend over its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        config: &BackendConfig,
    ) -> Self {
        let codec = SessionCodec::new(&config.session_secret);
        Self {
            inner: Arc::new(BackendInner {
                store,
                blobs,
                codec,
                secure_cookies: config.cookies_secure(),
            }),
        }
    }

    /// The record store collaborator.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }

    /// The blob store collaborator.
    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.blobs.as_ref()
    }

    /// Authentication operations.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store())
    }

    /// Customer account operations.
    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService::new(self.store())
    }

    /// Administrator account operations.
    #[must_use]
    pub fn admins(&self) -> AdminService<'_> {
        AdminService::new(self.store())
    }

    /// Brand operations.
    #[must_use]
    pub fn brands(&self) -> BrandService<'_> {
        BrandService::new(self.store())
    }

    /// Category operations.
    #[must_use]
    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(self.store())
    }

    /// Product operations.
    #[must_use]
    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(self.store())
    }

    /// Address operations.
    #[must_use]
    pub fn addresses(&self) -> AddressService<'_> {
        AddressService::new(self.store())
    }

    /// Cart operations.
    #[must_use]
    pub fn carts(&self) -> CartService<'_> {
        CartService::new(self.store())
    }

    /// Order operations.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.store())
    }

    /// Wish list operations.
    #[must_use]
    pub fn wish_lists(&self) -> WishListService<'_> {
        WishListService::new(self.store())
    }

    /// Review operations.
    #[must_use]
    pub fn reviews(&self) -> ReviewService<'_> {
        ReviewService::new(self.store())
    }

    /// Image operations.
    #[must_use]
    pub fn images(&self) -> ImageService<'_> {
        ImageService::new(self.store(), self.blobs())
    }

    /// Direct access to the cascade orchestrator.
    #[must_use]
    pub fn cascade(&self) -> CascadeOrchestrator<'_> {
        CascadeOrchestrator::new(self.store())
    }

    /// Direct access to the aggregate maintainer.
    #[must_use]
    pub fn aggregates(&self) -> AggregateMaintainer<'_> {
        AggregateMaintainer::new(self.store())
    }

    /// The session token codec.
    #[must_use]
    pub fn session_codec(&self) -> &SessionCodec {
        &self.inner.codec
    }

    /// Cookie-writing half of the session lifecycle.
    #[must_use]
    pub fn session_store(&self) -> SessionStore<'_> {
        SessionStore::new(&self.inner.codec, self.inner.secure_cookies)
    }

    /// Cookie-reading half of the session lifecycle.
    #[must_use]
    pub fn session_resolver(&self) -> SessionResolver<'_> {
        SessionResolver::new(&self.inner.codec)
    }
}
