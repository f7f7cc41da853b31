//! Order management.

use sqlx::PgPool;

use mais_saude_core::catalog::{Order, OrderItem};
use mais_saude_core::{OrderId, OrderStatus};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, created_at, customer_name, customer_phone, customer_address, \
                             total_amount, status, payment_method, notes";

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders newest first, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM shop."order"
            WHERE $1::shop.order_status IS NULL OR status = $1
            ORDER BY created_at DESC
            "#
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// The `limit` most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            r#"SELECT {ORDER_COLUMNS} FROM shop."order" ORDER BY created_at DESC LIMIT $1"#
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// An order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let sql = format!(r#"SELECT {ORDER_COLUMNS} FROM shop."order" WHERE id = $1"#);
        let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, price_at_purchase
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY product_name ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some((order, items)))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"UPDATE shop."order" SET status = $2 WHERE id = $1"#)
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(order_id = %id, status = %status, "Order status changed");
        Ok(())
    }

    /// Delete an order; its items cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM shop."order" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }
}
