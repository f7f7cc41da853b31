//! Product management routes.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use mais_saude_core::catalog::{Category, ProductWithRelations};
use mais_saude_core::{Price, ProductId};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{CurrentAdmin, ProductDraft, ProductForm};
use crate::state::AppState;

use super::{Layout, NoticeParams, redirect_success};

// =============================================================================
// Views and Templates
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub price: String,
    pub active: bool,
    pub image: Option<String>,
}

impl From<&ProductWithRelations> for ProductRowView {
    fn from(full: &ProductWithRelations) -> Self {
        let p = &full.product;
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            slug: p.slug.clone(),
            category: full.category.as_ref().map(|c| c.name.clone()),
            price: Price::display_or_on_request(p.price),
            active: p.active,
            image: full.primary_image().map(str::to_owned),
        }
    }
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductRowView>,
    pub q: String,
}

#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub title: &'static str,
    /// Form `action` URL.
    pub action: String,
    pub form: ProductForm,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

/// A `<option>` of the category select.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

fn category_options(categories: Vec<Category>, selected: &str) -> Vec<CategoryOption> {
    categories
        .into_iter()
        .map(|c| {
            let id = c.id.to_string();
            CategoryOption {
                selected: id == selected,
                id,
                name: c.name,
            }
        })
        .collect()
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_form))
        .route("/products/{id}", post(update))
        .route("/products/{id}/edit", get(edit_form))
        .route("/products/{id}/toggle", post(toggle))
        .route("/products/{id}/delete", post(delete))
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub q: Option<String>,
    #[serde(flatten)]
    pub notices: NoticeParams,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /products
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Html<String>> {
    let products = ProductRepository::new(state.pool())
        .list(query.q.as_deref())
        .await?;

    let page = ProductsIndexTemplate {
        layout: Layout::new(&admin, "/products", query.notices),
        products: products.iter().map(ProductRowView::from).collect(),
        q: query.q.unwrap_or_default(),
    };
    Ok(Html(page.render()?))
}

/// GET /products/new
async fn new_form(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
) -> Result<Response> {
    render_form(
        &state,
        &admin,
        FormTarget::Create,
        ProductForm::new_product(),
        None,
    )
    .await
}

/// GET /products/{id}/edit
async fn edit_form(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    render_form(
        &state,
        &admin,
        FormTarget::Update(id),
        ProductForm::from_product(&product),
        None,
    )
    .await
}

/// POST /products
#[instrument(skip(admin, state, form), fields(name = %form.name))]
async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let draft = match ProductDraft::try_from(&form) {
        Ok(draft) => draft,
        Err(e) => {
            return render_form(&state, &admin, FormTarget::Create, form, Some(e.to_string()))
                .await;
        }
    };

    match ProductRepository::new(state.pool()).create(&draft).await {
        Ok(_) => Ok(redirect_success("/products", "Produto criado.").into_response()),
        Err(RepositoryError::Conflict(_)) => {
            render_form(&state, &admin, FormTarget::Create, form, Some(slug_taken(&draft))).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /products/{id}
#[instrument(skip(admin, state, form))]
async fn update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let target = FormTarget::Update(id);
    let draft = match ProductDraft::try_from(&form) {
        Ok(draft) => draft,
        Err(e) => return render_form(&state, &admin, target, form, Some(e.to_string())).await,
    };

    match ProductRepository::new(state.pool()).update(id, &draft).await {
        Ok(()) => Ok(redirect_success("/products", "Produto atualizado.").into_response()),
        Err(RepositoryError::Conflict(_)) => {
            render_form(&state, &admin, target, form, Some(slug_taken(&draft))).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /products/{id}/toggle
#[instrument(skip(_admin, state))]
async fn toggle(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let active = ProductRepository::new(state.pool())
        .toggle_active(id)
        .await?;
    let message = if active {
        "Produto ativado."
    } else {
        "Produto desativado."
    };
    Ok(redirect_success("/products", message))
}

/// POST /products/{id}/delete
#[instrument(skip(_admin, state))]
async fn delete(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(redirect_success("/products", "Produto excluído."))
}

// =============================================================================
// Helpers
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum FormTarget {
    Create,
    Update(ProductId),
}

fn slug_taken(draft: &ProductDraft) -> String {
    format!("Já existe um produto com o slug \"{}\".", draft.slug)
}

/// Render the product form; with an error it answers 422.
async fn render_form(
    state: &AppState,
    admin: &CurrentAdmin,
    target: FormTarget,
    form: ProductForm,
    error: Option<String>,
) -> Result<Response> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let (title, action) = match target {
        FormTarget::Create => ("Novo produto", "/products".to_owned()),
        FormTarget::Update(id) => ("Editar produto", format!("/products/{id}")),
    };
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    let page = ProductFormTemplate {
        layout: Layout::new(admin, "/products", NoticeParams::default()),
        title,
        action,
        categories: category_options(categories, form.category_id.trim()),
        form,
        error,
    };
    Ok((status, Html(page.render()?)).into_response())
}

#[cfg(test)]
mod tests {
    use mais_saude_core::CategoryId;

    use super::*;

    #[test]
    fn test_category_options_mark_selected() {
        let category = |name: &str| Category {
            id: CategoryId::generate(),
            name: name.to_owned(),
            slug: name.to_lowercase(),
            sort: 0,
        };
        let (a, b) = (category("Beleza"), category("Higiene"));
        let selected = b.id.to_string();

        let options = category_options(vec![a, b], &selected);
        let flags: Vec<bool> = options.iter().map(|o| o.selected).collect();
        assert_eq!(flags, [false, true]);
        assert!(category_options(Vec::new(), "").is_empty());
    }
}
