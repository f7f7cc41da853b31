//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use mais_saude_core::catalog::Testimonial;

use super::page::PageContext;
use super::products::ProductView;
use super::testimonials::TestimonialFormTemplate;
use crate::db::testimonials::PUBLIC_TESTIMONIAL_LIMIT;
use crate::db::{CatalogRepository, ProductFilter, TestimonialRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub products: Vec<ProductView>,
    pub testimonials: Vec<Testimonial>,
    pub feedback_form: TestimonialFormTemplate,
}

/// Display the home page: hero, categories, catalog, testimonials and feedback form.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let page = PageContext::load(&state, &session, customer.as_ref(), nonce).await?;

    let products = CatalogRepository::new(state.pool())
        .list_products(&ProductFilter::default())
        .await?;
    let testimonials = TestimonialRepository::new(state.pool())
        .list_approved(PUBLIC_TESTIMONIAL_LIMIT)
        .await?;

    Ok(HomeTemplate {
        products: ProductView::list(&products, &page.settings),
        page,
        testimonials,
        feedback_form: TestimonialFormTemplate::empty(),
    })
}
