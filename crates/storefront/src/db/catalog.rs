//! Catalog reads: categories, products and their images.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use mais_saude_core::catalog::{Category, Product, ProductImage, ProductWithRelations};
use mais_saude_core::{CategoryId, ProductId};

use super::{RepositoryError, like_pattern};

const PRODUCT_COLUMNS: &str = "p.id, p.created_at, p.name, p.slug, p.description, p.price, \
                               p.active, p.category_id, p.whatsapp_message";

/// Filters for product listings.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive match on name or description.
    pub query: Option<String>,
    /// Hide inactive products (the public default).
    pub active_only: bool,
    pub limit: Option<i64>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            query: None,
            active_only: true,
            limit: None,
        }
    }
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by `sort`, then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, sort
            FROM shop.category
            ORDER BY sort ASC, name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Products matching `filter`, newest first, with category and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        let pattern = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);

        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            WHERE ($1::uuid IS NULL OR p.category_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2)
              AND (NOT $3 OR p.active)
            ORDER BY p.created_at DESC
            LIMIT $4
            "
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.category_id)
            .bind(pattern)
            .bind(filter.active_only)
            .bind(filter.limit)
            .fetch_all(self.pool)
            .await?;

        self.with_relations(products).await
    }

    /// A product by slug, with category and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_product_by_slug(
        &self,
        slug: &str,
        active_only: bool,
    ) -> Result<Option<ProductWithRelations>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p WHERE p.slug = $1 AND (NOT $2 OR p.active)"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .bind(active_only)
            .fetch_optional(self.pool)
            .await?;

        self.single_with_relations(product).await
    }

    /// An active product by ID, used when adding to the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_active_product(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithRelations>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.product p WHERE p.id = $1 AND p.active");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        self.single_with_relations(product).await
    }

    /// Active products by ID, used to reprice the cart at checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p WHERE p.id = ANY($1) AND p.active"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    async fn single_with_relations(
        &self,
        product: Option<Product>,
    ) -> Result<Option<ProductWithRelations>, RepositoryError> {
        match product {
            Some(p) => Ok(self.with_relations(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Attach categories and images to products in two batched queries.
    async fn with_relations(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id.as_uuid()).collect();
        let category_ids: Vec<Uuid> = products
            .iter()
            .filter_map(|p| p.category_id.map(|c| c.as_uuid()))
            .collect();

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

        let categories = if category_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, Category>(
                "SELECT id, name, slug, sort FROM shop.category WHERE id = ANY($1)",
            )
            .bind(&category_ids)
            .fetch_all(self.pool)
            .await?
        };

        Ok(assemble(products, categories, images))
    }
}

/// Group images and categories onto their products, keeping product order.
pub(crate) fn assemble(
    products: Vec<Product>,
    categories: Vec<Category>,
    images: Vec<ProductImage>,
) -> Vec<ProductWithRelations> {
    let categories: HashMap<CategoryId, Category> =
        categories.into_iter().map(|c| (c.id, c)).collect();

    let mut images_by_product: HashMap<ProductId, Vec<ProductImage>> = HashMap::new();
    for image in images {
        images_by_product
            .entry(image.product_id)
            .or_default()
            .push(image);
    }

    products
        .into_iter()
        .map(|product| {
            let mut images = images_by_product.remove(&product.id).unwrap_or_default();
            images.sort_by_key(|img| img.sort);
            ProductWithRelations {
                category: product.category_id.and_then(|id| categories.get(&id).cloned()),
                images,
                product,
            }
        })
        .collect()
}
