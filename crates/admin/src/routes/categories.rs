//! Category management routes.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use tracing::instrument;

use mais_saude_core::CategoryId;

use crate::db::categories::CategoryWithCount;
use crate::db::{CategoryRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{CategoryDraft, CategoryForm};
use crate::state::AppState;

use super::{Layout, NoticeParams, redirect_error, redirect_success};

#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryWithCount>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", post(update))
        .route("/categories/{id}/delete", post(delete))
}

/// GET /categories
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notices): Query<NoticeParams>,
) -> Result<Html<String>> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;

    let page = CategoriesTemplate {
        layout: Layout::new(&admin, "/categories", notices),
        categories,
    };
    Ok(Html(page.render()?))
}

/// POST /categories
#[instrument(skip(_admin, state, form))]
async fn create(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let draft = match CategoryDraft::try_from(&form) {
        Ok(draft) => draft,
        Err(e) => return Ok(redirect_error("/categories", &e.to_string())),
    };

    match CategoryRepository::new(state.pool()).create(&draft).await {
        Ok(category) => Ok(redirect_success(
            "/categories",
            &format!("Categoria \"{}\" criada.", category.name),
        )),
        Err(RepositoryError::Conflict(_)) => Ok(redirect_error(
            "/categories",
            &format!("Já existe uma categoria com o slug \"{}\".", draft.slug),
        )),
        Err(e) => Err(e.into()),
    }
}

/// POST /categories/{id}
#[instrument(skip(_admin, state, form))]
async fn update(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let draft = match CategoryDraft::try_from(&form) {
        Ok(draft) => draft,
        Err(e) => return Ok(redirect_error("/categories", &e.to_string())),
    };

    match CategoryRepository::new(state.pool()).update(id, &draft).await {
        Ok(_) => Ok(redirect_success("/categories", "Categoria atualizada.")),
        Err(RepositoryError::Conflict(_)) => Ok(redirect_error(
            "/categories",
            &format!("Já existe uma categoria com o slug \"{}\".", draft.slug),
        )),
        Err(e) => Err(e.into()),
    }
}

/// POST /categories/{id}/delete
#[instrument(skip(_admin, state))]
async fn delete(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Redirect> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(redirect_success(
        "/categories",
        "Categoria excluída. Os produtos ficaram sem categoria.",
    ))
}
