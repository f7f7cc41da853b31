//! Data every full page needs: store settings, navigation and header state.

use tower_sessions::Session;

use mais_saude_core::catalog::Category;
use mais_saude_core::{StoreSettings, whatsapp};

use super::cart::load_cart;
use crate::error::Result;
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

/// Layout context shared by `base.html`.
#[derive(Clone)]
pub struct PageContext {
    pub nonce: String,
    pub settings: StoreSettings,
    pub categories: Vec<Category>,
    /// Generic "order on WhatsApp" chat link.
    pub whatsapp_url: String,
    pub customer_name: Option<String>,
    pub cart_count: u32,
    pub flash: Option<String>,
}

impl PageContext {
    /// Load settings and categories (cached) plus the visitor's cart badge and flash message.
    ///
    /// # Errors
    ///
    /// Returns an error if settings or categories cannot be loaded.
    pub async fn load(
        state: &AppState,
        session: &Session,
        customer: Option<&CurrentCustomer>,
        nonce: String,
    ) -> Result<Self> {
        let settings = state.cache().store_settings(state.pool()).await?;
        let categories = state.cache().categories(state.pool()).await?;
        let cart_count = load_cart(session).await.total_items();
        let flash = take_flash(session).await;

        Ok(Self {
            nonce,
            whatsapp_url: whatsapp::link(&settings.whatsapp_number, whatsapp::DEFAULT_INQUIRY),
            settings,
            categories,
            customer_name: customer.map(|c| c.first_name().to_owned()),
            cart_count,
            flash,
        })
    }
}

/// Queue a message for the next rendered page.
pub async fn set_flash(session: &Session, message: &str) {
    if let Err(e) = session.insert(session_keys::FLASH, message).await {
        tracing::warn!("Failed to store flash message: {e}");
    }
}

/// Take (and clear) the pending flash message.
async fn take_flash(session: &Session) -> Option<String> {
    session
        .remove::<String>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}
