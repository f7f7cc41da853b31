//! Testimonial moderation.

use serde::Deserialize;
use sqlx::PgPool;

use mais_saude_core::TestimonialId;
use mais_saude_core::catalog::Testimonial;

use super::RepositoryError;

/// Which testimonials the moderation list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestimonialFilter {
    #[default]
    All,
    /// Hidden, awaiting approval.
    Pending,
    /// Visible on the storefront.
    Approved,
}

impl TestimonialFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Pending, Self::Approved];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Todos",
            Self::Pending => "Pendentes",
            Self::Approved => "Aprovados",
        }
    }

    /// The `active` value rows must have, or `None` for any.
    const fn active(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Pending => Some(false),
            Self::Approved => Some(true),
        }
    }
}

pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Testimonials matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: TestimonialFilter) -> Result<Vec<Testimonial>, RepositoryError> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            r"
            SELECT id, created_at, customer_name, rating, comment, active
            FROM shop.testimonial
            WHERE $1::bool IS NULL OR active = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(filter.active())
        .fetch_all(self.pool)
        .await?;

        Ok(testimonials)
    }

    /// Approve a hidden testimonial or hide an approved one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn toggle(&self, id: TestimonialId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE shop.testimonial SET active = NOT active WHERE id = $1 RETURNING active",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn delete(&self, id: TestimonialId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.testimonial WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_active_flag() {
        assert_eq!(TestimonialFilter::All.active(), None);
        assert_eq!(TestimonialFilter::Pending.active(), Some(false));
        assert_eq!(TestimonialFilter::Approved.active(), Some(true));
    }

    #[test]
    fn test_filter_from_query() {
        #[derive(Deserialize)]
        struct Query {
            #[serde(default)]
            filter: TestimonialFilter,
        }
        let q: Query = serde_json::from_str(r#"{"filter":"pending"}"#).unwrap();
        assert_eq!(q.filter, TestimonialFilter::Pending);
        let q: Query = serde_json::from_str("{}").unwrap();
        assert_eq!(q.filter, TestimonialFilter::All);
    }
}
