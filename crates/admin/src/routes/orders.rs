//! Order management routes.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use mais_saude_core::catalog::{Order, OrderItem};
use mais_saude_core::types::phone::format_phone;
use mais_saude_core::{OrderId, OrderStatus, Phone, whatsapp};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters::{self, local_datetime};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

use super::{Layout, NoticeParams, non_empty, redirect_success};

// =============================================================================
// Views
// =============================================================================

/// One row of an order table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: String,
    pub code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub total: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub created_at: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            code: order.short_code(),
            customer_name: order.customer_name.clone(),
            customer_phone: format_phone(&order.customer_phone),
            total: order.total_amount.display(),
            status_label: order.status.label(),
            status_class: order.status.badge_class(),
            created_at: local_datetime(&order.created_at),
        }
    }
}

/// One line on the order detail page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_name: String,
    /// Link to the product's edit page while it still exists.
    pub product_url: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            product_url: item.product_id.map(|id| format!("/products/{id}/edit")),
            quantity: item.quantity,
            unit_price: item.price_at_purchase.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// A status choice in the filter tabs or the status form.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn status_options(current: Option<OrderStatus>) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: current == Some(status),
        })
        .collect()
}

/// `wa.me` link to message the customer, when the stored phone is valid.
fn customer_whatsapp_url(phone: &str) -> Option<String> {
    Phone::parse(phone)
        .ok()
        .map(|p| whatsapp::link(&p.whatsapp_digits(), ""))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderRowView>,
    pub statuses: Vec<StatusOption>,
    pub filtered: bool,
}

#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: Layout,
    pub order: OrderRowView,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub payment_method: String,
    pub items: Vec<OrderItemView>,
    pub statuses: Vec<StatusOption>,
    pub whatsapp_url: Option<String>,
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", post(update_status))
        .route("/orders/{id}/delete", post(delete))
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub notices: NoticeParams,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /orders
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Html<String>> {
    // Unknown status values list everything.
    let status = non_empty(query.status.as_deref()).and_then(|s| s.parse::<OrderStatus>().ok());
    let orders = OrderRepository::new(state.pool()).list(status).await?;

    let page = OrdersIndexTemplate {
        layout: Layout::new(&admin, "/orders", query.notices),
        orders: orders.iter().map(OrderRowView::from).collect(),
        statuses: status_options(status),
        filtered: status.is_some(),
    };
    Ok(Html(page.render()?))
}

/// GET /orders/{id}
#[instrument(skip(admin, state))]
async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Query(notices): Query<NoticeParams>,
) -> Result<Html<String>> {
    let (order, items) = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let page = OrderShowTemplate {
        layout: Layout::new(&admin, "/orders", notices),
        address: order.customer_address.clone(),
        notes: order.notes.clone(),
        payment_method: order.payment_method.clone(),
        items: items.iter().map(OrderItemView::from).collect(),
        statuses: status_options(Some(order.status)),
        whatsapp_url: customer_whatsapp_url(&order.customer_phone),
        order: OrderRowView::from(&order),
    };
    Ok(Html(page.render()?))
}

/// POST /orders/{id}/status
#[instrument(skip(_admin, state))]
async fn update_status(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let status: OrderStatus = form.status.parse().map_err(AppError::BadRequest)?;
    OrderRepository::new(state.pool())
        .update_status(id, status)
        .await?;

    Ok(redirect_success(
        &format!("/orders/{id}"),
        &format!("Status alterado para {}.", status.label()),
    ))
}

/// POST /orders/{id}/delete
#[instrument(skip(_admin, state))]
async fn delete(
    RequireWriteAccess(_admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(redirect_success("/orders", "Pedido excluído."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_options_mark_current() {
        let options = status_options(Some(OrderStatus::Shipped));
        assert_eq!(options.len(), OrderStatus::ALL.len());
        let selected: Vec<&str> = options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, ["shipped"]);
    }

    #[test]
    fn test_customer_whatsapp_url() {
        let url = customer_whatsapp_url("75991357869");
        assert!(url.is_some_and(|u| u.starts_with("https://wa.me/5575991357869")));
        assert_eq!(customer_whatsapp_url("123"), None);
    }
}
