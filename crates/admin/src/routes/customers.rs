//! Customers list route handler.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use mais_saude_core::types::phone::format_phone;
use mais_saude_core::{Phone, whatsapp};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters::{self, local_datetime};
use crate::middleware::RequireAdminAuth;
use crate::services::{CustomerSummary, aggregate_customers, filter_customers};
use crate::state::AppState;

use super::orders::OrderRowView;
use super::{Layout, NoticeParams};

#[derive(Debug, Deserialize)]
pub struct CustomersQuery {
    pub q: Option<String>,
    #[serde(flatten)]
    pub notices: NoticeParams,
}

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub order_count: usize,
    pub total_spent: String,
    pub last_order_at: String,
    pub whatsapp_url: Option<String>,
    pub orders: Vec<OrderRowView>,
}

impl From<&CustomerSummary> for CustomerView {
    fn from(customer: &CustomerSummary) -> Self {
        Self {
            name: customer.name.clone(),
            phone: format_phone(&customer.phone),
            address: customer.address.clone(),
            order_count: customer.order_count,
            total_spent: customer.total_spent.display(),
            last_order_at: local_datetime(&customer.last_order_at),
            whatsapp_url: Phone::parse(&customer.phone)
                .ok()
                .map(|p| whatsapp::link(&p.whatsapp_digits(), "")),
            orders: customer.orders.iter().map(OrderRowView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersTemplate {
    pub layout: Layout,
    pub customers: Vec<CustomerView>,
    pub q: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/customers", get(index))
}

/// Customers page handler.
///
/// GET /customers
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CustomersQuery>,
) -> Result<Html<String>> {
    let orders = OrderRepository::new(state.pool()).list(None).await?;
    let customers = filter_customers(aggregate_customers(orders), query.q.as_deref());

    let page = CustomersTemplate {
        layout: Layout::new(&admin, "/customers", query.notices),
        customers: customers.iter().map(CustomerView::from).collect(),
        q: query.q.unwrap_or_default(),
    };
    Ok(Html(page.render()?))
}
