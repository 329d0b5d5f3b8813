//! Order repository for database operations.
//!
//! Aggregate reads are two statements: the order header(s), then the line
//! items joined with `products`. Line prices come from the live catalog.

use std::collections::HashMap;

use sqlx::PgPool;

use tinystore_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, OrderLine, OrderWithProducts};

/// Result of attempting to add a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddItemOutcome {
    /// The item was inserted.
    Added(OrderItem),
    /// No order has the given ID.
    OrderMissing,
    /// The order exists but no longer accepts items.
    OrderNotActive(Order),
}

/// Repository for order and line-item database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an `active` order for a user.
    ///
    /// Does not check whether the user already has an active order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user_id: UserId) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (user_id, status)
            VALUES ($1, $2)
            RETURNING id, user_id, status
            ",
        )
        .bind(user_id)
        .bind(OrderStatus::Active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user"))
    }

    /// Get an order header without its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails or a joined
    /// price cannot be decoded.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<OrderWithProducts>, RepositoryError> {
        match self.find(id).await? {
            Some(order) => Ok(self.with_products(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Get the user's active order with its line items.
    ///
    /// If several active orders exist the lowest ID wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails or a joined
    /// price cannot be decoded.
    pub async fn get_current_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<OrderWithProducts>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status
            FROM orders
            WHERE user_id = $1 AND status = $2
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(OrderStatus::Active)
        .fetch_optional(self.pool)
        .await?;

        match order {
            Some(order) => Ok(self.with_products(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Get all of the user's completed orders, newest ID first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails or a joined
    /// price cannot be decoded.
    pub async fn get_completed_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithProducts>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status
            FROM orders
            WHERE user_id = $1 AND status = $2
            ORDER BY id DESC
            ",
        )
        .bind(user_id)
        .bind(OrderStatus::Complete)
        .fetch_all(self.pool)
        .await?;

        self.with_products(orders).await
    }

    /// Add a line item if the order is still active.
    ///
    /// The status check and the insert share a transaction that holds a row
    /// lock on the order, so a concurrent status change cannot slip between
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<AddItemOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status
            FROM orders
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = order else {
            return Ok(AddItemOutcome::OrderMissing);
        };
        if !order.status.accepts_items() {
            return Ok(AddItemOutcome::OrderNotActive(order));
        }

        let item = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO orderitem (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, order_id, product_id, quantity
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product"))?;

        tx.commit().await?;

        Ok(AddItemOutcome::Added(item))
    }

    /// Set an order's status.
    ///
    /// Returns `None` if the order doesn't exist. Any transition is applied,
    /// including `complete` back to `active`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET status = $1
            WHERE id = $2
            RETURNING id, user_id, status
            ",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Attach line items to each order, preserving the order of `orders`.
    async fn with_products(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithProducts>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT oi.order_id, oi.product_id, p.name AS product_name, oi.quantity, p.price
            FROM orderitem oi
            JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut lines: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            lines.entry(row.order_id).or_default().push(row.line);
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderWithProducts {
                products: lines.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }
}

/// A joined line item tagged with its order.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    line: OrderLine,
}
