//! WhatsApp checkout.
//!
//! The cart held in the session is a snapshot taken when each product was
//! added. Before recording an order the lines are repriced against the
//! catalog, so a stale session can neither keep an old price nor order a
//! product that was hidden in the meantime.

use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use mais_saude_core::catalog::{NewOrder, NewOrderItem, Order, PAYMENT_METHOD_WHATSAPP, Product};
use mais_saude_core::whatsapp::{self, OrderMessage};
use mais_saude_core::{
    Cart, CartLine, CustomerId, OrderStatus, Phone, PhoneError, Price, ProductId, StoreSettings,
};

use crate::db::{CatalogRepository, CustomerRepository, OrderRepository, RepositoryError};
use crate::models::Customer;

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("whatsapp orders are disabled")]
    OrdersDisabled,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CheckoutError {
    /// Message shown above the checkout form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Seu carrinho está vazio.".to_owned(),
            Self::OrdersDisabled => {
                "Pedidos pelo WhatsApp estão temporariamente desativados.".to_owned()
            }
            Self::MissingField(field) => format!("Preencha o campo {field}."),
            Self::InvalidPhone(_) => {
                "Telefone inválido. Informe DDD e número, por exemplo (75) 99135-7869.".to_owned()
            }
            Self::Repository(_) => "Não foi possível registrar o pedido. Tente novamente.".to_owned(),
        }
    }
}

/// Checkout form input.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub neighborhood: String,
    pub complement: String,
    pub notes: String,
    /// Ship to the address saved in the customer's profile.
    pub use_saved_address: bool,
    /// Store the typed address in the customer's profile.
    pub save_address: bool,
}

/// A recorded order and the link that hands it over to WhatsApp.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub whatsapp_url: String,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate the form, record the order and build the `wa.me` link.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrdersDisabled` when the store turned WhatsApp
    /// orders off, `CheckoutError::EmptyCart` when no orderable line remains
    /// `CheckoutError::MissingField` for a blank name, phone or address and
    /// `CheckoutError::InvalidPhone` for a phone without DDD and number.
    #[instrument(skip_all, fields(lines = cart.lines().len()))]
    pub async fn place_order(
        &self,
        cart: &Cart,
        settings: &StoreSettings,
        customer: Option<&Customer>,
        details: &CheckoutDetails,
    ) -> Result<PlacedOrder, CheckoutError> {
        if !settings.enable_whatsapp_orders {
            return Err(CheckoutError::OrdersDisabled);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping = resolve_shipping(details, customer)?;

        let ids: Vec<ProductId> = cart.lines().iter().map(|l| l.product_id).collect();
        let products = CatalogRepository::new(self.pool)
            .get_active_products(&ids)
            .await?;
        let cart = reprice(cart, &products);
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if let Some(customer) = customer
            && details.save_address
            && !details.use_saved_address
        {
            let mut profile = customer.profile.clone();
            profile.address.clone_from(&shipping.address);
            profile.neighborhood.clone_from(&shipping.neighborhood);
            profile.complement.clone_from(&shipping.complement);
            CustomerRepository::new(self.pool)
                .update_profile(customer.id, &profile)
                .await?;
        }

        let full_address =
            whatsapp::full_address(&shipping.address, &shipping.neighborhood, &shipping.complement);
        let notes = non_blank(&details.notes);

        let new_order = build_order(
            &cart,
            &shipping,
            &full_address,
            notes.clone(),
            customer.map(|c| c.id),
        );
        let order = OrderRepository::new(self.pool).create(&new_order).await?;
        tracing::info!(order_id = %order.id, total = %order.total_amount, "Order recorded");

        let customer_phone = shipping.phone.display();
        let message = OrderMessage {
            store_name: &settings.store_name,
            customer_name: &shipping.name,
            customer_phone: &customer_phone,
            full_address: &full_address,
            notes: notes.as_deref(),
            cart: &cart,
        };

        Ok(PlacedOrder {
            order,
            whatsapp_url: message.link(&settings.whatsapp_number),
        })
    }
}

/// Name, phone and address the order ships to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shipping {
    name: String,
    phone: Phone,
    address: String,
    neighborhood: String,
    complement: String,
}

fn resolve_shipping(
    details: &CheckoutDetails,
    customer: Option<&Customer>,
) -> Result<Shipping, CheckoutError> {
    let name = details.name.trim();
    if name.is_empty() {
        return Err(CheckoutError::MissingField("nome"));
    }
    if details.phone.trim().is_empty() {
        return Err(CheckoutError::MissingField("telefone"));
    }
    let phone = Phone::parse(&details.phone)?;

    let saved = customer
        .map(|c| &c.profile)
        .filter(|p| details.use_saved_address && p.has_address());

    let (address, neighborhood, complement) = match saved {
        Some(profile) => (
            profile.address.trim(),
            profile.neighborhood.trim(),
            profile.complement.trim(),
        ),
        None => (
            details.address.trim(),
            details.neighborhood.trim(),
            details.complement.trim(),
        ),
    };
    if address.is_empty() {
        return Err(CheckoutError::MissingField("endereço"));
    }

    Ok(Shipping {
        name: name.to_owned(),
        phone,
        address: address.to_owned(),
        neighborhood: neighborhood.to_owned(),
        complement: complement.to_owned(),
    })
}

/// Rebuild the cart from current catalog data, dropping products no longer for sale.
fn reprice(cart: &Cart, products: &[Product]) -> Cart {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut repriced = Cart::new();
    for line in cart.lines() {
        let Some(product) = by_id.get(&line.product_id) else {
            tracing::debug!(product_id = %line.product_id, "Dropping unavailable cart line");
            continue;
        };
        repriced.add(CartLine {
            product_id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: product.price,
            image_url: line.image_url.clone(),
            quantity: line.quantity,
        });
    }
    repriced
}

fn build_order(
    cart: &Cart,
    shipping: &Shipping,
    full_address: &str,
    notes: Option<String>,
    customer_id: Option<CustomerId>,
) -> NewOrder {
    let items = cart
        .lines()
        .iter()
        .map(|line| NewOrderItem {
            product_id: Some(line.product_id),
            product_name: line.name.clone(),
            quantity: line.quantity,
            price_at_purchase: line.price.unwrap_or(Price::ZERO),
        })
        .collect();

    NewOrder {
        customer_name: shipping.name.clone(),
        // National digits only: the back-office groups customers by this column.
        customer_phone: shipping.phone.national().to_owned(),
        customer_address: Some(full_address.to_owned()),
        notes,
        status: OrderStatus::Pending,
        payment_method: PAYMENT_METHOD_WHATSAPP.to_owned(),
        customer_id,
        items,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}
