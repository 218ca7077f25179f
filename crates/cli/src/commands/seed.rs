//! Seed the database with a small demo catalog.
//!
//! Intended for local development only: creates one brand, two categories,
//! and a handful of products so the application has something to show.

use rust_decimal::Decimal;

use copperleaf_backend::services::catalog::{
    BrandService, CategoryService, CreateProductInput, ProductService,
};
use copperleaf_core::Price;

/// Seed a demo catalog.
///
/// # Errors
///
/// Returns an error if configuration is missing or any create fails (e.g.,
/// re-running against an already-seeded database).
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store) = super::connect().await?;

    let brand = BrandService::new(&store)
        .create("Copperleaf Goods".to_owned())
        .await?;

    let categories = CategoryService::new(&store);
    let kitchen = categories.create("Kitchen".to_owned()).await?;
    let garden = categories.create("Garden".to_owned()).await?;

    let products = ProductService::new(&store);
    let demo = [
        ("Copper Kettle", Decimal::new(5900, 2), 25, kitchen.id),
        ("Cast Iron Skillet", Decimal::new(3450, 2), 40, kitchen.id),
        ("Pruning Shears", Decimal::new(1895, 2), 60, garden.id),
        ("Watering Can", Decimal::new(2200, 2), 30, garden.id),
    ];
    for (name, price, stock, category_id) in demo {
        products
            .create(CreateProductInput {
                name: name.to_owned(),
                description: None,
                price: Price::new(price),
                stock,
                brand_id: brand.id,
                category_id,
            })
            .await?;
    }

    tracing::info!(brand_id = %brand.id, products = demo.len(), "demo catalog seeded");
    Ok(())
}
