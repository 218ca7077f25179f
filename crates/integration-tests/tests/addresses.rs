//! Default-address exclusivity: at most one address per user has
//! `default = true`, across any sequence of creations and updates.

#![allow(clippy::unwrap_used)]

use copperleaf_backend::services::addresses::{CreateAddressInput, UpdateAddressInput};
use copperleaf_core::UserId;
use copperleaf_integration_tests::TestContext;

fn address_input(user_id: UserId, street: &str, default: bool) -> CreateAddressInput {
    CreateAddressInput {
        user_id,
        street: street.to_owned(),
        city: "Utrecht".to_owned(),
        postal_code: "3511AB".to_owned(),
        country: "NL".to_owned(),
        is_default: default,
    }
}

async fn default_count(ctx: &TestContext, user_id: UserId) -> usize {
    ctx.backend
        .addresses()
        .list_for_user(user_id)
        .await
        .unwrap()
        .iter()
        .filter(|a| a.is_default)
        .count()
}

#[tokio::test]
async fn second_default_displaces_the_first() {
    let ctx = TestContext::new();
    let user = ctx.user("oskar").await;

    let a = ctx
        .backend
        .addresses()
        .create(address_input(user.id, "Oudegracht 1", true))
        .await
        .unwrap();
    assert!(a.is_default);

    let b = ctx
        .backend
        .addresses()
        .create(address_input(user.id, "Nieuwegracht 2", true))
        .await
        .unwrap();
    assert!(b.is_default);

    // Only B remains default.
    let addresses = ctx.backend.addresses().list_for_user(user.id).await.unwrap();
    assert_eq!(addresses.len(), 2);
    let defaults: Vec<_> = addresses.iter().filter(|addr| addr.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults.first().unwrap().id, b.id);
}

#[tokio::test]
async fn update_to_default_clears_others() {
    let ctx = TestContext::new();
    let user = ctx.user("petra").await;

    let a = ctx
        .backend
        .addresses()
        .create(address_input(user.id, "Oudegracht 1", true))
        .await
        .unwrap();
    let b = ctx
        .backend
        .addresses()
        .create(address_input(user.id, "Nieuwegracht 2", false))
        .await
        .unwrap();

    let b = ctx
        .backend
        .addresses()
        .update(
            b.id,
            UpdateAddressInput {
                is_default: Some(true),
                ..UpdateAddressInput::default()
            },
        )
        .await
        .unwrap();
    assert!(b.is_default);

    let a = ctx.backend.addresses().find_by_id(a.id).await.unwrap();
    assert!(!a.is_default);
    assert_eq!(default_count(&ctx, user.id).await, 1);
}

#[tokio::test]
async fn exclusivity_holds_across_mixed_sequences() {
    let ctx = TestContext::new();
    let user = ctx.user("quinn").await;

    let streets = ["A 1", "B 2", "C 3", "D 4"];
    let mut ids = Vec::new();
    for (i, street) in streets.iter().enumerate() {
        let address = ctx
            .backend
            .addresses()
            .create(address_input(user.id, street, i % 2 == 0))
            .await
            .unwrap();
        ids.push(address.id);
        assert!(default_count(&ctx, user.id).await <= 1);
    }

    for id in ids {
        ctx.backend
            .addresses()
            .update(
                id,
                UpdateAddressInput {
                    is_default: Some(true),
                    ..UpdateAddressInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(default_count(&ctx, user.id).await, 1);
    }
}

#[tokio::test]
async fn defaults_are_scoped_per_user() {
    let ctx = TestContext::new();
    let first = ctx.user("rita").await;
    let second = ctx.user("sven").await;

    ctx.backend
        .addresses()
        .create(address_input(first.id, "Oudegracht 1", true))
        .await
        .unwrap();
    ctx.backend
        .addresses()
        .create(address_input(second.id, "Nieuwegracht 2", true))
        .await
        .unwrap();

    // One default each; neither displaced the other.
    assert_eq!(default_count(&ctx, first.id).await, 1);
    assert_eq!(default_count(&ctx, second.id).await, 1);
}
