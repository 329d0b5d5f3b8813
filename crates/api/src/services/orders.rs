//! Order lifecycle.
//!
//! Orders are created `active`, collect line items while active, and are
//! closed by setting their status to `complete`. Validation happens before
//! any storage access.

use sqlx::PgPool;
use thiserror::Error;

use tinystore_core::{OrderId, OrderStatus, ProductId, UserId, ValidationError};

use crate::db::RepositoryError;
use crate::db::orders::{AddItemOutcome, OrderRepository};
use crate::models::order::{Order, OrderItem, OrderWithProducts};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced order, user or product does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// The order is not in a state that allows the operation.
    #[error("{0}")]
    InvalidState(&'static str),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order lifecycle service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Open a new order for a user.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the user doesn't exist.
    pub async fn create(&self, user_id: UserId) -> Result<Order, OrderError> {
        let order = self.orders.create(user_id).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => OrderError::NotFound("User not found"),
            other => OrderError::Repository(other),
        })?;

        tracing::info!(order_id = %order.id, user_id = %user_id, "Order created");
        Ok(order)
    }

    /// Add a product to an active order.
    ///
    /// Duplicate products become separate line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` if `quantity` is not positive.
    /// Returns `OrderError::NotFound` if the order or product doesn't exist.
    /// Returns `OrderError::InvalidState` if the order is complete.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<OrderItem, OrderError> {
        if quantity <= 0 {
            return Err(ValidationError::new("Quantity must be a positive number").into());
        }

        let outcome = self
            .orders
            .add_item(order_id, product_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => OrderError::NotFound("Product not found"),
                other => OrderError::Repository(other),
            })?;

        match outcome {
            AddItemOutcome::Added(item) => {
                tracing::debug!(order_id = %order_id, product_id = %product_id, quantity, "Line item added");
                Ok(item)
            }
            AddItemOutcome::OrderMissing => Err(OrderError::NotFound("Order not found")),
            AddItemOutcome::OrderNotActive(_) => Err(OrderError::InvalidState(
                "Cannot add products to a completed order",
            )),
        }
    }

    /// Set an order's status from its wire form.
    ///
    /// Returns `None` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` if `status` is not exactly `active` or
    /// `complete`; storage is not touched in that case.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<Option<Order>, OrderError> {
        let status: OrderStatus = status
            .parse()
            .map_err(|e: tinystore_core::OrderStatusError| ValidationError::new(e.to_string()))?;

        let order = self.orders.update_status(order_id, status).await?;
        if let Some(order) = &order {
            tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
        }
        Ok(order)
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the database operation fails.
    pub async fn get_by_id(&self, order_id: OrderId) -> Result<Option<OrderWithProducts>, OrderError> {
        Ok(self.orders.get_by_id(order_id).await?)
    }

    /// Get the user's active order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the database operation fails.
    pub async fn current_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<OrderWithProducts>, OrderError> {
        Ok(self.orders.get_current_by_user(user_id).await?)
    }

    /// Get the user's completed orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the database operation fails.
    pub async fn completed_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithProducts>, OrderError> {
        Ok(self.orders.get_completed_by_user(user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    /// A pool that never connects; any query against it fails.
    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(50))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_item_rejects_non_positive_quantity_before_storage() {
        let pool = unreachable_pool();
        let service = OrderService::new(&pool);

        for quantity in [0, -5] {
            let err = service
                .add_item(OrderId::new(1), ProductId::new(1), quantity)
                .await
                .unwrap_err();
            assert!(
                matches!(&err, OrderError::Validation(v) if v.message() == "Quantity must be a positive number"),
                "got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_update_status_validates_before_storage() {
        let pool = unreachable_pool();
        let service = OrderService::new(&pool);

        for status in ["shipped", "Complete", ""] {
            let err = service
                .update_status(OrderId::new(1), status)
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::Validation(_)), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn test_valid_status_reaches_storage() {
        let pool = unreachable_pool();
        let service = OrderService::new(&pool);

        let err = service
            .update_status(OrderId::new(1), "complete")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Repository(_)), "got {err:?}");
    }
}
