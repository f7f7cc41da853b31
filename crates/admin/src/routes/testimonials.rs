//! Testimonial moderation routes.

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use mais_saude_core::TestimonialId;
use mais_saude_core::catalog::Testimonial;

use crate::db::{TestimonialFilter, TestimonialRepository};
use crate::error::Result;
use crate::filters::{self, local_datetime};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

use super::{Layout, NoticeParams, redirect_success};

#[derive(Debug, Deserialize)]
pub struct TestimonialsQuery {
    #[serde(default)]
    pub filter: TestimonialFilter,
    #[serde(flatten)]
    pub notices: NoticeParams,
}

#[derive(Debug, Clone)]
pub struct TestimonialView {
    pub id: String,
    pub customer_name: String,
    pub stars: String,
    pub comment: String,
    pub approved: bool,
    pub created_at: String,
}

impl From<&Testimonial> for TestimonialView {
    fn from(t: &Testimonial) -> Self {
        Self {
            id: t.id.to_string(),
            customer_name: t.customer_name.clone(),
            stars: t.rating.stars(),
            comment: t.comment.clone(),
            approved: t.active,
            created_at: local_datetime(&t.created_at),
        }
    }
}

/// A filter tab.
#[derive(Debug, Clone)]
pub struct FilterTab {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "testimonials/index.html")]
pub struct TestimonialsTemplate {
    pub layout: Layout,
    pub testimonials: Vec<TestimonialView>,
    pub tabs: Vec<FilterTab>,
    /// Query string that brings the moderator back to the same tab.
    pub filter: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/testimonials", get(index))
        .route("/testimonials/{id}/toggle", post(toggle))
        .route("/testimonials/{id}/delete", post(delete))
}

/// Back-link kept across moderation actions.
#[derive(Debug, Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    pub filter: TestimonialFilter,
}

fn list_path(filter: TestimonialFilter) -> String {
    format!("/testimonials?filter={}", filter.as_str())
}

/// GET /testimonials
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<TestimonialsQuery>,
) -> Result<Html<String>> {
    let testimonials = TestimonialRepository::new(state.pool())
        .list(query.filter)
        .await?;

    let page = TestimonialsTemplate {
        layout: Layout::new(&admin, "/testimonials", query.notices),
        testimonials: testimonials.iter().map(TestimonialView::from).collect(),
        tabs: TestimonialFilter::ALL
            .into_iter()
            .map(|f| FilterTab {
                value: f.as_str(),
                label: f.label(),
                selected: f == query.filter,
            })
            .collect(),
        filter: query.filter.as_str(),
    };
    Ok(Html(page.render()?))
}

/// POST /testimonials/{id}/toggle
#[instrument(skip(_admin, state))]
async fn toggle(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    Query(back): Query<ReturnTo>,
) -> Result<Redirect> {
    let approved = TestimonialRepository::new(state.pool()).toggle(id).await?;
    let message = if approved {
        "Depoimento aprovado."
    } else {
        "Depoimento ocultado."
    };
    Ok(redirect_success(&list_path(back.filter), message))
}

/// POST /testimonials/{id}/delete
#[instrument(skip(_admin, state))]
async fn delete(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    Query(back): Query<ReturnTo>,
) -> Result<Redirect> {
    TestimonialRepository::new(state.pool()).delete(id).await?;
    Ok(redirect_success(&list_path(back.filter), "Depoimento excluído."))
}
