//! Operation-surface behavior: the validation gate short-circuits before any
//! store access, constraint violations surface as conflicts, and updates
//! patch only the named fields.

#![allow(clippy::unwrap_used)]

use copperleaf_backend::BackendError;
use copperleaf_backend::services::catalog::CreateProductInput;
use copperleaf_backend::services::reviews::CreateReviewInput;
use copperleaf_backend::services::users::{CreateUserInput, UpdateUserInput};
use copperleaf_core::{BrandId, CategoryId, OrderStatus, UserId};
use copperleaf_integration_tests::{TEST_PASSWORD, TestContext, price};

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let ctx = TestContext::new();
    let user = ctx.user("xenia").await;

    let err = ctx
        .backend
        .users()
        .create(CreateUserInput {
            username: "other".to_owned(),
            email: user.email.to_string(),
            password: TEST_PASSWORD.to_owned(),
            first_name: None,
            last_name: None,
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Conflict(_)));
}

#[tokio::test]
async fn validation_failure_short_circuits_before_the_store() {
    let ctx = TestContext::new();

    // Brand/category ids are bogus, but the empty name is rejected first —
    // nothing is written and no NotFound is raised.
    let err = ctx
        .backend
        .products()
        .create(CreateProductInput {
            name: "  ".to_owned(),
            description: None,
            price: price(1000),
            stock: 1,
            brand_id: BrandId::generate(),
            category_id: CategoryId::generate(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)));
    assert!(ctx.backend.products().list().await.unwrap().is_empty());

    let err = ctx
        .backend
        .users()
        .create(CreateUserInput {
            username: "yuri".to_owned(),
            email: "not-an-email".to_owned(),
            password: TEST_PASSWORD.to_owned(),
            first_name: None,
            last_name: None,
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)));
    assert!(ctx.backend.users().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let ctx = TestContext::new();
    let err = ctx
        .backend
        .users()
        .create(CreateUserInput {
            username: "zoe".to_owned(),
            email: "zoe@example.com".to_owned(),
            password: "short".to_owned(),
            first_name: None,
            last_name: None,
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Validation(_)));
}

#[tokio::test]
async fn user_update_patches_only_named_fields() {
    let ctx = TestContext::new();
    let user = ctx.user("anton").await;

    let updated = ctx
        .backend
        .users()
        .update(
            user.id,
            UpdateUserInput {
                first_name: Some("Anton".to_owned()),
                ..UpdateUserInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name.as_deref(), Some("Anton"));
    assert_eq!(updated.username, user.username);
    assert_eq!(updated.email, user.email);
}

#[tokio::test]
async fn one_cart_and_one_wish_list_per_user() {
    let ctx = TestContext::new();
    let user = ctx.user("boris").await;

    ctx.backend.carts().create(user.id).await.unwrap();
    assert!(matches!(
        ctx.backend.carts().create(user.id).await.unwrap_err(),
        BackendError::Conflict(_)
    ));

    ctx.backend.wish_lists().create(user.id).await.unwrap();
    assert!(matches!(
        ctx.backend.wish_lists().create(user.id).await.unwrap_err(),
        BackendError::Conflict(_)
    ));
}

#[tokio::test]
async fn review_rating_must_be_in_range() {
    let ctx = TestContext::new();
    let user = ctx.user("carla").await;
    let kettle = ctx.product("Kettle", 1000, 5).await;

    for rating in [0, 6] {
        let err = ctx
            .backend
            .reviews()
            .create(CreateReviewInput {
                user_id: user.id,
                product_id: kettle.id,
                rating,
                comment: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Validation(_)), "rating {rating}");
    }
}

#[tokio::test]
async fn order_status_transitions_persist() {
    let ctx = TestContext::new();
    let user = ctx.user("dmitri").await;
    let kettle = ctx.product("Kettle", 1000, 5).await;

    let order = ctx
        .backend
        .orders()
        .create(copperleaf_backend::services::orders::CreateOrderInput {
            user_id: user.id,
            items: vec![copperleaf_backend::services::orders::OrderLineInput {
                product_id: kettle.id,
                quantity: 1,
            }],
        })
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let order = ctx
        .backend
        .orders()
        .update_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn operations_on_missing_entities_are_not_found() {
    let ctx = TestContext::new();

    assert!(matches!(
        ctx.backend.users().find_by_id(UserId::generate()).await,
        Err(BackendError::NotFound { kind: "user" })
    ));
    assert!(matches!(
        ctx.backend.carts().create(UserId::generate()).await,
        Err(BackendError::NotFound { kind: "user" })
    ));
}
