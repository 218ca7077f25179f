//! Integration tests for Copperleaf.
//!
//! Scenarios run end-to-end through [`Backend`] against the in-memory record
//! and blob stores, so the full service surface — validation gate, aggregate
//! maintainer, cascade orchestrator, session subsystem — is exercised with
//! no external processes.
//!
//! ```bash
//! cargo test -p copperleaf-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::SecretString;

use copperleaf_backend::Backend;
use copperleaf_backend::blob::MemoryBlobStore;
use copperleaf_backend::config::BackendConfig;
use copperleaf_backend::models::{Brand, Category, Product, User};
use copperleaf_backend::services::catalog::CreateProductInput;
use copperleaf_backend::services::users::CreateUserInput;
use copperleaf_backend::store::memory::MemoryStore;
use copperleaf_core::Price;

/// Password used for every fixture principal.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Test harness: a backend over fresh in-memory stores.
pub struct TestContext {
    pub backend: Backend,
}

impl TestContext {
    /// Build a backend over empty in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let config = BackendConfig {
            database_url: SecretString::from("postgres://unused-in-memory-tests"),
            session_secret: SecretString::from("kX9vQ2mL8pR4tZ7wB3nH6jD1fG5sA0yE"),
            base_url: "https://shop.test".to_owned(),
            blob_base_url: "https://media.shop.test".to_owned(),
        };
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new("https://media.shop.test"));
        Self {
            backend: Backend::new(store, blobs, &config),
        }
    }

    /// Create a user with a unique email.
    ///
    /// # Panics
    ///
    /// Panics if creation fails — fixtures are expected to be valid.
    pub async fn user(&self, username: &str) -> User {
        self.backend
            .users()
            .create(CreateUserInput {
                username: username.to_owned(),
                email: format!("{username}@example.com"),
                password: TEST_PASSWORD.to_owned(),
                first_name: None,
                last_name: None,
                phone: None,
            })
            .await
            .expect("fixture user")
    }

    /// Create a brand.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    pub async fn brand(&self, name: &str) -> Brand {
        self.backend
            .brands()
            .create(name.to_owned())
            .await
            .expect("fixture brand")
    }

    /// Create a category.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    pub async fn category(&self, name: &str) -> Category {
        self.backend
            .categories()
            .create(name.to_owned())
            .await
            .expect("fixture category")
    }

    /// Create a product under fresh fixture brand/category.
    ///
    /// # Panics
    ///
    /// Panics if creation fails.
    pub async fn product(&self, name: &str, price_cents: i64, stock: u32) -> Product {
        let brand = self.brand(&format!("{name} brand")).await;
        let category = self.category(&format!("{name} category")).await;
        self.backend
            .products()
            .create(CreateProductInput {
                name: name.to_owned(),
                description: None,
                price: Price::new(Decimal::new(price_cents, 2)),
                stock,
                brand_id: brand.id,
                category_id: category.id,
            })
            .await
            .expect("fixture product")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a `Price` from cents.
#[must_use]
pub fn price(cents: i64) -> Price {
    Price::new(Decimal::new(cents, 2))
}
