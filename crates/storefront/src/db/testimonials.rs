//! Public testimonials.

use sqlx::PgPool;

use mais_saude_core::catalog::{NewTestimonial, Testimonial};

use super::RepositoryError;

/// How many approved testimonials the storefront shows.
pub const PUBLIC_TESTIMONIAL_LIMIT: i64 = 6;

pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Approved testimonials, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved(&self, limit: i64) -> Result<Vec<Testimonial>, RepositoryError> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            r"
            SELECT id, created_at, customer_name, rating, comment, active
            FROM shop.testimonial
            WHERE active
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(testimonials)
    }

    /// Store feedback hidden, pending moderation in the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn submit(&self, feedback: &NewTestimonial) -> Result<Testimonial, RepositoryError> {
        let testimonial = sqlx::query_as::<_, Testimonial>(
            r"
            INSERT INTO shop.testimonial (customer_name, rating, comment, active)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, created_at, customer_name, rating, comment, active
            ",
        )
        .bind(&feedback.customer_name)
        .bind(i32::from(feedback.rating))
        .bind(&feedback.comment)
        .fetch_one(self.pool)
        .await?;

        Ok(testimonial)
    }
}
