//! Aggregate-consistency scenarios: after every line-item mutation the
//! parent's `items_count` equals the sum of child quantities and
//! `total_price` the sum of child totals.

#![allow(clippy::unwrap_used)]

use copperleaf_backend::services::carts::AddCartItemInput;
use copperleaf_backend::services::orders::{CreateOrderInput, OrderLineInput};
use copperleaf_integration_tests::{TestContext, price};

#[tokio::test]
async fn cart_aggregates_follow_item_additions() {
    let ctx = TestContext::new();
    let user = ctx.user("casper").await;
    // 10.00 and 5.00 unit prices.
    let kettle = ctx.product("Kettle", 1000, 100).await;
    let trivet = ctx.product("Trivet", 500, 100).await;

    let cart = ctx.backend.carts().create(user.id).await.unwrap();
    assert_eq!(cart.items_count, 0);
    assert_eq!(cart.total_price, price(0));

    // quantity=2 at 10.00 -> total 20.00
    ctx.backend
        .carts()
        .add_item(AddCartItemInput {
            cart_id: cart.id,
            product_id: kettle.id,
            quantity: 2,
        })
        .await
        .unwrap();

    let cart = ctx.backend.carts().find_by_id(cart.id).await.unwrap();
    assert_eq!(cart.items_count, 2);
    assert_eq!(cart.total_price, price(2000));

    // quantity=1 at 5.00 -> itemsCount=3, totalPrice=25.00
    ctx.backend
        .carts()
        .add_item(AddCartItemInput {
            cart_id: cart.id,
            product_id: trivet.id,
            quantity: 1,
        })
        .await
        .unwrap();

    let cart = ctx.backend.carts().find_by_id(cart.id).await.unwrap();
    assert_eq!(cart.items_count, 3);
    assert_eq!(cart.total_price, price(2500));
}

#[tokio::test]
async fn cart_aggregates_follow_update_and_removal() {
    let ctx = TestContext::new();
    let user = ctx.user("dora").await;
    let kettle = ctx.product("Kettle", 1000, 100).await;

    let cart = ctx.backend.carts().create(user.id).await.unwrap();
    let item = ctx
        .backend
        .carts()
        .add_item(AddCartItemInput {
            cart_id: cart.id,
            product_id: kettle.id,
            quantity: 2,
        })
        .await
        .unwrap();

    // Grow the line to 5 units.
    let updated = ctx.backend.carts().update_item(item.id, 5).await.unwrap();
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.total_price, price(5000));

    let cart = ctx.backend.carts().find_by_id(cart.id).await.unwrap();
    assert_eq!(cart.items_count, 5);
    assert_eq!(cart.total_price, price(5000));

    // Remove it; the cart returns to empty sums.
    ctx.backend.carts().remove_item(item.id).await.unwrap();
    let cart = ctx.backend.carts().find_by_id(cart.id).await.unwrap();
    assert_eq!(cart.items_count, 0);
    assert_eq!(cart.total_price, price(0));
}

#[tokio::test]
async fn order_aggregates_follow_item_deletion() {
    let ctx = TestContext::new();
    let user = ctx.user("emil").await;
    // Unit prices 10.00 each: quantities 2 and 3 give totals 20.00 and 30.00.
    let kettle = ctx.product("Kettle", 1000, 100).await;
    let skillet = ctx.product("Skillet", 1000, 100).await;

    let order = ctx
        .backend
        .orders()
        .create(CreateOrderInput {
            user_id: user.id,
            items: vec![
                OrderLineInput {
                    product_id: kettle.id,
                    quantity: 2,
                },
                OrderLineInput {
                    product_id: skillet.id,
                    quantity: 3,
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(order.items_count, 5);
    assert_eq!(order.total_price, price(5000));

    // Delete the quantity-2 line -> itemsCount=3, totalPrice=30.00.
    let items = ctx.backend.orders().items(order.id).await.unwrap();
    let doomed = items.iter().find(|i| i.quantity == 2).unwrap();
    ctx.backend.orders().remove_item(doomed.id).await.unwrap();

    let order = ctx.backend.orders().find_by_id(order.id).await.unwrap();
    assert_eq!(order.items_count, 3);
    assert_eq!(order.total_price, price(3000));
}

#[tokio::test]
async fn order_lines_debit_stock() {
    let ctx = TestContext::new();
    let user = ctx.user("frida").await;
    let kettle = ctx.product("Kettle", 1000, 10).await;

    let order = ctx
        .backend
        .orders()
        .create(CreateOrderInput {
            user_id: user.id,
            items: vec![OrderLineInput {
                product_id: kettle.id,
                quantity: 4,
            }],
        })
        .await
        .unwrap();

    let product = ctx.backend.products().find_by_id(kettle.id).await.unwrap();
    assert_eq!(product.stock, 6);

    // Growing the line debits only the delta; shrinking restores it.
    let items = ctx.backend.orders().items(order.id).await.unwrap();
    let line = items.first().unwrap();
    ctx.backend.orders().update_item(line.id, 6).await.unwrap();
    let product = ctx.backend.products().find_by_id(kettle.id).await.unwrap();
    assert_eq!(product.stock, 4);

    ctx.backend.orders().update_item(line.id, 1).await.unwrap();
    let product = ctx.backend.products().find_by_id(kettle.id).await.unwrap();
    assert_eq!(product.stock, 9);
}

#[tokio::test]
async fn order_rejects_insufficient_stock() {
    let ctx = TestContext::new();
    let user = ctx.user("greta").await;
    let kettle = ctx.product("Kettle", 1000, 3).await;

    let err = ctx
        .backend
        .orders()
        .create(CreateOrderInput {
            user_id: user.id,
            items: vec![OrderLineInput {
                product_id: kettle.id,
                quantity: 4,
            }],
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        copperleaf_backend::BackendError::Conflict(_)
    ));

    // Stock is untouched by the rejected line.
    let product = ctx.backend.products().find_by_id(kettle.id).await.unwrap();
    assert_eq!(product.stock, 3);
}

#[tokio::test]
async fn order_item_deletion_does_not_restock() {
    let ctx = TestContext::new();
    let user = ctx.user("hugo").await;
    let kettle = ctx.product("Kettle", 1000, 10).await;

    let order = ctx
        .backend
        .orders()
        .create(CreateOrderInput {
            user_id: user.id,
            items: vec![OrderLineInput {
                product_id: kettle.id,
                quantity: 4,
            }],
        })
        .await
        .unwrap();

    let items = ctx.backend.orders().items(order.id).await.unwrap();
    ctx.backend
        .orders()
        .remove_item(items.first().unwrap().id)
        .await
        .unwrap();

    // Deliberate: removal leaves stock debited.
    let product = ctx.backend.products().find_by_id(kettle.id).await.unwrap();
    assert_eq!(product.stock, 6);
}
