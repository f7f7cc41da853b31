//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mais_saude_core::catalog::{Category, ProductWithRelations};
use mais_saude_core::types::price::PRICE_ON_REQUEST;
use mais_saude_core::{Price, StoreSettings, whatsapp};

use super::page::PageContext;
use crate::db::{CatalogRepository, ProductFilter};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::state::AppState;

/// How many products from the same category the detail page suggests.
const RELATED_LIMIT: usize = 4;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub has_price: bool,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
    /// "Ask on WhatsApp" link with the product name filled in.
    pub whatsapp_url: String,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &ProductWithRelations, settings: &StoreSettings) -> Self {
        let p = &product.product;
        let shown_price = p.price.filter(|_| settings.show_prices);
        let inquiry = whatsapp::product_inquiry(
            p.whatsapp_message.as_deref(),
            whatsapp::DEFAULT_INQUIRY,
            Some(&p.name),
        );

        Self {
            id: p.id.to_string(),
            slug: p.slug.clone(),
            name: p.name.clone(),
            description: p.description.clone().unwrap_or_default(),
            price: shown_price.map_or_else(|| PRICE_ON_REQUEST.to_owned(), |price| price.display()),
            has_price: shown_price.is_some(),
            image_url: product.primary_image().map(str::to_owned),
            images: product.image_urls().into_iter().map(str::to_owned).collect(),
            category: product.category.as_ref().map(|c| c.name.clone()),
            whatsapp_url: whatsapp::link(&settings.whatsapp_number, &inquiry),
        }
    }

    /// Views for a list of products.
    #[must_use]
    pub fn list(products: &[ProductWithRelations], settings: &StoreSettings) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, settings)).collect()
    }
}

/// Catalog query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Category slug.
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub products: Vec<ProductView>,
    pub active_category: Option<Category>,
    pub query: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductView,
    pub related_products: Vec<ProductView>,
}

/// Quick view fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_view.html")]
pub struct QuickViewTemplate {
    pub product: ProductView,
}

/// Display product listing page.
///
/// An unknown category slug lists every product.
#[instrument(skip(state, session, customer, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let page = PageContext::load(&state, &session, customer.as_ref(), nonce).await?;

    let active_category = query
        .category
        .as_deref()
        .and_then(|slug| page.categories.iter().find(|c| c.slug == slug))
        .cloned();
    let search = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_owned);

    let filter = ProductFilter {
        category_id: active_category.as_ref().map(|c| c.id),
        query: search.clone(),
        ..ProductFilter::default()
    };
    let products = CatalogRepository::new(state.pool())
        .list_products(&filter)
        .await?;

    Ok(ProductsIndexTemplate {
        products: ProductView::list(&products, &page.settings),
        page,
        active_category,
        query: search.unwrap_or_default(),
    })
}

/// Display product detail page.
#[instrument(skip(state, session, customer, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .get_product_by_slug(&slug, true)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("produto {slug}")))?;

    let page = PageContext::load(&state, &session, customer.as_ref(), nonce).await?;

    let related_products = match product.product.category_id {
        Some(category_id) => {
            let filter = ProductFilter {
                category_id: Some(category_id),
                limit: i64::try_from(RELATED_LIMIT + 1).ok(),
                ..ProductFilter::default()
            };
            let related = catalog.list_products(&filter).await?;
            related
                .iter()
                .filter(|p| p.product.id != product.product.id)
                .take(RELATED_LIMIT)
                .map(|p| ProductView::new(p, &page.settings))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(ProductShowTemplate {
        product: ProductView::new(&product, &page.settings),
        page,
        related_products,
    })
}

/// Display quick view fragment (for HTMX).
#[instrument(skip(state))]
pub async fn quick_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = CatalogRepository::new(state.pool())
        .get_product_by_slug(&slug, true)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("produto {slug}")))?;
    let settings = state.cache().store_settings(state.pool()).await?;

    Ok(QuickViewTemplate {
        product: ProductView::new(&product, &settings),
    })
}

/// Price label helper for templates that only have a raw price.
#[must_use]
pub fn price_label(price: Option<Price>, settings: &StoreSettings) -> String {
    price
        .filter(|_| settings.show_prices)
        .map_or_else(|| PRICE_ON_REQUEST.to_owned(), |p| p.display())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use mais_saude_core::ProductId;
    use mais_saude_core::catalog::Product;

    use super::*;

    fn product(price: Option<u32>, message: Option<&str>) -> ProductWithRelations {
        ProductWithRelations {
            product: Product {
                id: ProductId::generate(),
                created_at: Utc::now(),
                name: "Protetor Solar FPS 50".to_owned(),
                slug: "protetor-solar-fps-50".to_owned(),
                description: None,
                price: price.map(Price::from_cents),
                active: true,
                category_id: None,
                whatsapp_message: message.map(str::to_owned),
            },
            category: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_product_view_price() {
        let settings = StoreSettings::default();
        let view = ProductView::new(&product(Some(5990), None), &settings);
        assert_eq!(view.price, "R$ 59,90");
        assert!(view.has_price);

        let view = ProductView::new(&product(None, None), &settings);
        assert_eq!(view.price, "Sob consulta");
        assert!(!view.has_price);
    }

    #[test]
    fn test_product_view_hidden_prices() {
        let settings = StoreSettings {
            show_prices: false,
            ..StoreSettings::default()
        };
        let view = ProductView::new(&product(Some(5990), None), &settings);
        assert_eq!(view.price, "Sob consulta");
        assert!(!view.has_price);
        assert_eq!(price_label(Some(Price::from_cents(100)), &settings), "Sob consulta");
    }

    #[test]
    fn test_product_view_whatsapp_link() {
        let settings = StoreSettings::default();
        let view = ProductView::new(&product(None, Some("Tem em estoque?")), &settings);
        assert!(view.whatsapp_url.starts_with("https://wa.me/5575991357869?text="));
        assert!(view.whatsapp_url.contains("Tem%20em%20estoque%3F%20Produto%3A%20Protetor"));
    }
}
