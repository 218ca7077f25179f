//! Shopping records: carts, orders, wish lists, and their line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperleaf_core::{
    CartId, CartItemId, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId, WishListId,
    WishListItemId,
};

use super::impl_record;

/// A user's cart (at most one per user).
///
/// `items_count` and `total_price` are derived from the cart's items and
/// recomputed by the aggregate maintainer after every item mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items_count: u32,
    pub total_price: Price,
}

/// One product line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// quantity x unit price at time of entry.
    pub total_price: Price,
}

/// A placed order. Aggregates are maintained exactly like [`Cart`]'s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items_count: u32,
    pub total_price: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One product line in an order. Creating or growing a line debits
/// `Product::stock`; deleting a line does not restock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: Price,
}

/// A user's wish list (at most one per user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishList {
    pub id: WishListId,
    pub user_id: UserId,
}

/// One product reference on a wish list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishListItem {
    pub id: WishListItemId,
    pub wish_list_id: WishListId,
    pub product_id: ProductId,
}

impl_record!(Cart, Cart);
impl_record!(CartItem, CartItem);
impl_record!(Order, Order);
impl_record!(OrderItem, OrderItem);
impl_record!(WishList, WishList);
impl_record!(WishListItem, WishListItem);
