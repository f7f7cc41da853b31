//! Public feedback form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use mais_saude_core::catalog::{NewTestimonial, TESTIMONIAL_THANKS};

use crate::db::TestimonialRepository;
use crate::error::Result;
use crate::state::AppState;

/// Feedback form data.
#[derive(Debug, Deserialize)]
pub struct TestimonialForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// Feedback form fragment (for HTMX), re-rendered with a message.
#[derive(Template, WebTemplate)]
#[template(path = "partials/testimonial_form.html")]
pub struct TestimonialFormTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub customer_name: String,
    pub rating: i32,
    pub comment: String,
}

impl TestimonialFormTemplate {
    /// Blank form with five stars preselected.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            error: None,
            success: None,
            customer_name: String::new(),
            rating: 5,
            comment: String::new(),
        }
    }
}

/// Store feedback for moderation.
///
/// Invalid input re-renders the form with the typed values and a message.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<TestimonialForm>,
) -> Result<Response> {
    let feedback = match NewTestimonial::validate(&form.customer_name, form.rating, &form.comment) {
        Ok(feedback) => feedback,
        Err(e) => {
            let template = TestimonialFormTemplate {
                error: Some(e.to_string()),
                success: None,
                customer_name: form.customer_name,
                rating: form.rating,
                comment: form.comment,
            };
            // 200 so HTMX swaps the fragment in
            return Ok(template.into_response());
        }
    };

    let saved = TestimonialRepository::new(state.pool())
        .submit(&feedback)
        .await?;
    tracing::info!(testimonial_id = %saved.id, "Feedback received");

    Ok(TestimonialFormTemplate {
        success: Some(TESTIMONIAL_THANKS.to_owned()),
        ..TestimonialFormTemplate::empty()
    }
    .into_response())
}
