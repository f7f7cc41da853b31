//! Product repository: listing, editing and images.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use mais_saude_core::ProductId;
use mais_saude_core::catalog::{Category, Product, ProductImage, ProductWithRelations};

use super::{RepositoryError, search_term};
use crate::models::ProductDraft;

const PRODUCT_COLUMNS: &str = "p.id, p.created_at, p.name, p.slug, p.description, p.price, \
                               p.active, p.category_id, p.whatsapp_message";

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first, optionally matching `q` on name or slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, q: Option<&str>) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            WHERE $1::text IS NULL OR p.name ILIKE $1 OR p.slug ILIKE $1
            ORDER BY p.created_at DESC
            "
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(search_term(q))
            .fetch_all(self.pool)
            .await?;

        self.with_relations(products).await
    }

    /// A product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductWithRelations>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.product p WHERE p.id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match product {
            Some(p) => Ok(self.with_relations(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Insert a product and its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, draft: &ProductDraft) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO shop.product
                (name, slug, description, price, category_id, active, whatsapp_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .bind(draft.active)
        .bind(&draft.whatsapp_message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        insert_images(&mut tx, id, &draft.image_urls).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, slug = %draft.slug, "Product created");
        Ok(id)
    }

    /// Update a product, replacing its images wholesale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE shop.product
            SET name = $2, slug = $3, description = $4, price = $5, category_id = $6,
                active = $7, whatsapp_message = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .bind(draft.active)
        .bind(&draft.whatsapp_message)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM shop.product_image WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_images(&mut tx, id, &draft.image_urls).await?;

        tx.commit().await?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(())
    }

    /// Flip the `active` flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn toggle_active(&self, id: ProductId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            r"
            UPDATE shop.product SET active = NOT active, updated_at = NOW()
            WHERE id = $1
            RETURNING active
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Images cascade; order items keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn with_relations(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id.as_uuid()).collect();

        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT id, product_id, url, sort
            FROM shop.product_image
            WHERE product_id = ANY($1)
            ORDER BY sort ASC
            ",
        )
        .bind(&product_ids)
        .fetch_all(self.pool)
        .await?;

        let categories: HashMap<_, Category> =
            sqlx::query_as::<_, Category>("SELECT id, name, slug, sort FROM shop.category")
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();

        let mut images_by_product: HashMap<ProductId, Vec<ProductImage>> = HashMap::new();
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductWithRelations {
                category: product
                    .category_id
                    .and_then(|id| categories.get(&id).cloned()),
                images: images_by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

async fn insert_images(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    urls: &[String],
) -> Result<(), RepositoryError> {
    for (sort, url) in (0_i32..).zip(urls) {
        sqlx::query("INSERT INTO shop.product_image (product_id, url, sort) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(url)
            .bind(sort)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
