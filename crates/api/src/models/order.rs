//! Order domain types.
//!
//! An order owns its line items. Aggregates join each line item with the
//! product's current name and price, so totals follow the live catalog.

use serde::Serialize;

use tinystore_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// An order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
}

/// A stored line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A line item joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Price,
}

/// An order together with its joined line items.
///
/// Serializes flat: `{id, user_id, status, products: [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithProducts {
    #[serde(flatten)]
    pub order: Order,
    pub products: Vec<OrderLine>,
}
