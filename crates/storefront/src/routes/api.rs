//! JSON API over the public catalog.
//!
//! Mirrors what the HTML pages show, for the PWA and external integrations.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mais_saude_core::CategoryId;
use mais_saude_core::catalog::{
    Category, NewTestimonial, ProductWithRelations, TESTIMONIAL_THANKS, Testimonial,
};

use crate::db::testimonials::PUBLIC_TESTIMONIAL_LIMIT;
use crate::db::{CatalogRepository, ProductFilter, TestimonialRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category_id: Option<CategoryId>,
    pub q: Option<String>,
    /// Defaults to `true`; `false` includes hidden products.
    pub active_only: Option<bool>,
}

impl From<ProductsQuery> for ProductFilter {
    fn from(q: ProductsQuery) -> Self {
        Self {
            category_id: q.category_id,
            query: q.q.filter(|s| !s.trim().is_empty()),
            active_only: q.active_only.unwrap_or(true),
            limit: None,
        }
    }
}

/// Feedback submitted as JSON.
#[derive(Debug, Deserialize)]
pub struct TestimonialRequest {
    pub customer_name: String,
    pub rating: i32,
    pub comment: String,
}

/// Response to accepted feedback.
#[derive(Debug, Serialize)]
pub struct TestimonialResponse {
    pub message: &'static str,
    pub testimonial: Testimonial,
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<ProductWithRelations>>> {
    let products = CatalogRepository::new(state.pool())
        .list_products(&ProductFilter::from(query))
        .await?;
    Ok(Json(products))
}

/// `GET /api/products/{slug}`
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductWithRelations>> {
    CatalogRepository::new(state.pool())
        .get_product_by_slug(&slug, true)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("produto {slug}")))
}

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.cache().categories(state.pool()).await?;
    Ok(Json(categories))
}

/// `GET /api/testimonials`: approved feedback, newest first.
#[instrument(skip(state))]
pub async fn testimonials(State(state): State<AppState>) -> Result<Json<Vec<Testimonial>>> {
    let testimonials = TestimonialRepository::new(state.pool())
        .list_approved(PUBLIC_TESTIMONIAL_LIMIT)
        .await?;
    Ok(Json(testimonials))
}

/// `POST /api/testimonials`: stored hidden until approved.
#[instrument(skip_all)]
pub async fn submit_testimonial(
    State(state): State<AppState>,
    Json(body): Json<TestimonialRequest>,
) -> Result<impl IntoResponse> {
    let feedback = NewTestimonial::validate(&body.customer_name, body.rating, &body.comment)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let testimonial = TestimonialRepository::new(state.pool())
        .submit(&feedback)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TestimonialResponse {
            message: TESTIMONIAL_THANKS,
            testimonial,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_query_defaults_to_active_only() {
        let filter = ProductFilter::from(ProductsQuery {
            category_id: None,
            q: Some("  ".to_owned()),
            active_only: None,
        });
        assert!(filter.active_only);
        assert!(filter.query.is_none());
    }

    #[test]
    fn test_products_query_can_include_hidden() {
        let filter = ProductFilter::from(ProductsQuery {
            category_id: Some(CategoryId::generate()),
            q: Some("vitamina".to_owned()),
            active_only: Some(false),
        });
        assert!(!filter.active_only);
        assert_eq!(filter.query.as_deref(), Some("vitamina"));
    }
}
