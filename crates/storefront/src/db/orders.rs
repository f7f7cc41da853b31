//! Orders recorded at checkout.

use sqlx::PgPool;
use uuid::Uuid;

use mais_saude_core::CustomerId;
use mais_saude_core::catalog::{NewOrder, Order};

use super::RepositoryError;

/// Repository for storefront order writes and a customer's order history.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO shop."order"
                (customer_name, customer_phone, customer_address, total_amount,
                 status, payment_method, notes, customer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at, customer_name, customer_phone, customer_address,
                      total_amount, status, payment_method, notes
            "#,
        )
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_address)
        .bind(order.total())
        .bind(order.status)
        .bind(&order.payment_method)
        .bind(&order.notes)
        .bind(order.customer_id)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity out of range: {}", item.quantity))
            })?;
            sqlx::query(
                r"
                INSERT INTO shop.order_item
                    (order_id, product_id, product_name, quantity, price_at_purchase)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(created.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(quantity)
            .bind(item.price_at_purchase)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Orders placed by a signed-in customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, created_at, customer_name, customer_phone, customer_address,
                   total_amount, status, payment_method, notes
            FROM shop."order"
            WHERE customer_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(Uuid::from(customer_id))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }
}
