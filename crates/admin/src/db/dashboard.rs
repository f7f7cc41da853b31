//! Dashboard figures.

use rust_decimal::Decimal;
use sqlx::PgPool;

use mais_saude_core::Price;

use super::RepositoryError;

/// Store-wide totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// Sum of `total_amount` over all orders.
    pub revenue: Price,
    pub order_count: i64,
    pub product_count: i64,
    /// Distinct customer phones across orders.
    pub customer_count: i64,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    revenue: Decimal,
    order_count: i64,
    product_count: i64,
    customer_count: i64,
}

/// Load the dashboard totals in one round trip.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if revenue is negative.
pub async fn load_stats(pool: &PgPool) -> Result<DashboardStats, RepositoryError> {
    let row = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            (SELECT COALESCE(SUM(total_amount), 0) FROM shop."order") AS revenue,
            (SELECT COUNT(*) FROM shop."order") AS order_count,
            (SELECT COUNT(*) FROM shop.product) AS product_count,
            (SELECT COUNT(DISTINCT customer_phone) FROM shop."order") AS customer_count
        "#,
    )
    .fetch_one(pool)
    .await?;

    let revenue = Price::new(row.revenue)
        .map_err(|e| RepositoryError::DataCorruption(format!("revenue: {e}")))?;

    Ok(DashboardStats {
        revenue,
        order_count: row.order_count,
        product_count: row.product_count,
        customer_count: row.customer_count,
    })
}
