//! Store settings routes.
//!
//! Every admin can see the settings; only super admins can change them.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use mais_saude_core::StoreSettings;

use crate::db::settings::{load_store_settings, save_store_settings};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireSuperAdmin};
use crate::state::AppState;

use super::{Layout, NoticeParams, redirect_error, redirect_success};

/// Settings page template.
#[derive(Template)]
#[template(path = "settings/index.html")]
pub struct SettingsTemplate {
    pub layout: Layout,
    pub settings: StoreSettings,
}

/// Settings form. Checkboxes are present only when checked.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub store_name: String,
    #[serde(default)]
    pub store_description: String,
    pub whatsapp_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub business_hours: String,
    pub primary_color: String,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub order_confirmation_message: String,
    pub enable_whatsapp_orders: Option<String>,
    pub show_prices: Option<String>,
    pub show_stock: Option<String>,
}

impl From<SettingsForm> for StoreSettings {
    fn from(form: SettingsForm) -> Self {
        let trim = |s: String| s.trim().to_owned();
        Self {
            store_name: trim(form.store_name),
            store_description: trim(form.store_description),
            whatsapp_number: form
                .whatsapp_number
                .chars()
                .filter(char::is_ascii_digit)
                .collect(),
            address: trim(form.address),
            business_hours: trim(form.business_hours),
            primary_color: trim(form.primary_color).to_lowercase(),
            welcome_message: trim(form.welcome_message),
            order_confirmation_message: trim(form.order_confirmation_message),
            enable_whatsapp_orders: form.enable_whatsapp_orders.is_some(),
            show_prices: form.show_prices.is_some(),
            show_stock: form.show_stock.is_some(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(settings_page).post(update))
}

/// Render the settings page.
///
/// GET /settings
#[instrument(skip(admin, state))]
async fn settings_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notices): Query<NoticeParams>,
) -> Result<Html<String>> {
    let settings = load_store_settings(state.pool()).await?;

    let page = SettingsTemplate {
        layout: Layout::new(&admin, "/settings", notices),
        settings,
    };
    Ok(Html(page.render()?))
}

/// Save the store settings.
///
/// POST /settings
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
async fn update(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect> {
    let settings = StoreSettings::from(form);
    if let Err(e) = settings.validate() {
        return Ok(redirect_error("/settings", &e.to_string()));
    }

    save_store_settings(state.pool(), &settings).await?;
    tracing::info!("Store settings updated");
    Ok(redirect_success("/settings", "Configurações salvas."))
}
