//! Search box suggestions (HTMX fragment).
//!
//! The input fires after the visitor pauses typing (`hx-trigger="keyup
//! changed delay:300ms"`), so one request covers a burst of keystrokes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::products::ProductView;
use crate::db::{CatalogRepository, ProductFilter};
use crate::error::Result;
use crate::state::AppState;

/// Shorter queries return no suggestions.
pub const MIN_QUERY_CHARS: usize = 2;

/// Suggestions shown in the dropdown.
pub const MAX_SUGGESTIONS: i64 = 6;

/// Search suggestions query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Search suggestions template (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_results.html")]
pub struct SearchResultsTemplate {
    pub query: String,
    pub results: Vec<ProductView>,
    /// The query was long enough to run.
    pub searched: bool,
}

/// Trimmed query, or `None` when it is too short to search.
fn searchable(q: &str) -> Option<&str> {
    let q = q.trim();
    (q.chars().count() >= MIN_QUERY_CHARS).then_some(q)
}

/// Search suggestions for the header dropdown.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<impl IntoResponse> {
    let Some(q) = searchable(&query.q) else {
        return Ok(SearchResultsTemplate {
            query: query.q,
            results: Vec::new(),
            searched: false,
        });
    };

    let filter = ProductFilter {
        query: Some(q.to_owned()),
        limit: Some(MAX_SUGGESTIONS),
        ..ProductFilter::default()
    };
    let products = CatalogRepository::new(state.pool())
        .list_products(&filter)
        .await?;
    let settings = state.cache().store_settings(state.pool()).await?;

    Ok(SearchResultsTemplate {
        query: q.to_owned(),
        results: ProductView::list(&products, &settings),
        searched: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable() {
        assert_eq!(searchable(" a "), None);
        assert_eq!(searchable(""), None);
        assert_eq!(searchable(" vi "), Some("vi"));
        assert_eq!(searchable("çã"), Some("çã"));
    }
}
