//! Category repository.

use sqlx::PgPool;

use mais_saude_core::CategoryId;
use mais_saude_core::catalog::Category;

use super::RepositoryError;
use crate::models::CategoryDraft;

/// A category with how many products reference it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    pub category: Category,
    pub product_count: i64,
}

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by `sort`, then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, sort FROM shop.category ORDER BY sort ASC, name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// All categories with their product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r"
            SELECT c.id, c.name, c.slug, c.sort, COUNT(p.id) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.sort ASC, c.name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, slug, sort)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, sort
            ",
        )
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(draft.sort)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        Ok(category)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE shop.category SET name = $2, slug = $3, sort = $4
            WHERE id = $1
            RETURNING id, name, slug, sort
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(draft.sort)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Its products become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
