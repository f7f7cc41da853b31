//! Dashboard route handler.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::db::dashboard::{DashboardStats, load_stats};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

use super::orders::OrderRowView;
use super::{Layout, NoticeParams};

/// How many orders the dashboard lists.
const RECENT_ORDER_LIMIT: i64 = 5;

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub stats: DashboardStats,
    pub recent_orders: Vec<OrderRowView>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
#[instrument(skip(admin, state))]
async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notices): Query<NoticeParams>,
) -> Result<Html<String>> {
    let orders = OrderRepository::new(state.pool());
    let (stats, recent) = tokio::try_join!(
        load_stats(state.pool()),
        orders.recent(RECENT_ORDER_LIMIT),
    )?;

    let page = DashboardTemplate {
        layout: Layout::new(&admin, "/", notices),
        stats,
        recent_orders: recent.iter().map(OrderRowView::from).collect(),
    };
    Ok(Html(page.render()?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use mais_saude_core::catalog::Order;
    use mais_saude_core::{AdminRole, AdminUserId, Email, OrderId, OrderStatus, Price};

    use super::*;
    use crate::models::CurrentAdmin;

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::generate(),
            email: Email::parse("admin@maissaude.com.br").unwrap(),
            name: "Ana".to_owned(),
            role: AdminRole::Admin,
        }
    }

    #[test]
    fn test_renders_stats_and_recent_orders() {
        let order = Order {
            id: OrderId::generate(),
            created_at: Utc::now(),
            customer_name: "Maria".to_owned(),
            customer_phone: "75991357869".to_owned(),
            customer_address: None,
            total_amount: Price::from_cents(2590),
            status: OrderStatus::Pending,
            payment_method: "whatsapp".to_owned(),
            notes: None,
        };
        let page = DashboardTemplate {
            layout: Layout::new(&admin(), "/", NoticeParams::default()),
            stats: DashboardStats {
                revenue: Price::from_cents(2590),
                order_count: 1,
                product_count: 12,
                customer_count: 1,
            },
            recent_orders: vec![OrderRowView::from(&order)],
        };

        let html = page.render().unwrap();
        assert!(html.contains("Maria"));
        assert!(html.contains("(75) 99135-7869"));
        assert!(!html.contains("Nenhum pedido ainda."));
    }

    #[test]
    fn test_renders_empty_state() {
        let page = DashboardTemplate {
            layout: Layout::new(&admin(), "/", NoticeParams::default()),
            stats: DashboardStats {
                revenue: Price::from_cents(0),
                order_count: 0,
                product_count: 0,
                customer_count: 0,
            },
            recent_orders: Vec::new(),
        };
        assert!(page.render().unwrap().contains("Nenhum pedido ainda."));
    }
}
