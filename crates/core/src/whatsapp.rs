//! WhatsApp click-to-chat links and the checkout order message.
//!
//! Orders are not paid in the app. Checkout composes a formatted message and
//! opens `wa.me` so the customer sends it to the store's number.

use std::fmt::Write as _;

use crate::cart::Cart;
use crate::types::price::PRICE_ON_REQUEST;

const WA_ME: &str = "https://wa.me";

/// Text pre-filled by the generic "order on WhatsApp" buttons.
pub const DEFAULT_INQUIRY: &str = "Olá! Gostaria de fazer um pedido na Farmácia Mais Saúde.";

/// Build a `wa.me` link that opens a chat with `number` pre-filled with `message`.
///
/// Non-digit characters in `number` are dropped.
#[must_use]
pub fn link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("{WA_ME}/{digits}?text={}", urlencoding::encode(message))
}

/// Text of a product's "ask on WhatsApp" button.
///
/// Uses the product's own message when set, otherwise the store default, and
/// appends the product name when one is given.
#[must_use]
pub fn product_inquiry(
    custom_message: Option<&str>,
    default_message: &str,
    product_name: Option<&str>,
) -> String {
    let base = custom_message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default_message);
    match product_name {
        Some(name) => format!("{base} Produto: {name}"),
        None => base.to_owned(),
    }
}

/// Join address parts with `", "`, skipping blank ones.
#[must_use]
pub fn full_address(address: &str, neighborhood: &str, complement: &str) -> String {
    [address, neighborhood, complement]
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything needed to compose the checkout message.
#[derive(Debug, Clone)]
pub struct OrderMessage<'a> {
    pub store_name: &'a str,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub full_address: &'a str,
    pub notes: Option<&'a str>,
    pub cart: &'a Cart,
}

impl OrderMessage<'_> {
    /// Render the message the customer sends to the store.
    #[must_use]
    pub fn render(&self) -> String {
        let mut items = String::new();
        for (i, line) in self.cart.lines().iter().enumerate() {
            if i > 0 {
                items.push('\n');
            }
            let amount = line
                .line_total()
                .map_or_else(|| PRICE_ON_REQUEST.to_owned(), |p| p.display());
            let _ = write!(items, "• {}x {} - {amount}", line.quantity, line.name);
        }

        let mut sections = vec![
            format!("🛒 *NOVO PEDIDO - {}*", self.store_name),
            format!(
                "👤 *Cliente:* {}\n📱 *Telefone:* {}\n📍 *Endereço:* {}",
                self.customer_name, self.customer_phone, self.full_address
            ),
            format!("📦 *Itens do Pedido:*\n{items}"),
            format!("💰 *Total:* {}", self.cart.total_price().display()),
        ];
        if let Some(notes) = self.notes.map(str::trim).filter(|n| !n.is_empty()) {
            sections.push(format!("📝 *Observações:* {notes}"));
        }
        sections.push("_Pedido realizado pelo catálogo digital_".to_owned());

        sections.join("\n\n")
    }

    /// `wa.me` link that sends the rendered message to `store_number`.
    #[must_use]
    pub fn link(&self, store_number: &str) -> String {
        link(store_number, &self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::types::{Price, ProductId};

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(CartLine {
            product_id: ProductId::generate(),
            slug: "dipirona-500mg".to_owned(),
            name: "Dipirona 500mg".to_owned(),
            price: Some(Price::from_cents(899)),
            image_url: None,
            quantity: 2,
        });
        cart.add(CartLine {
            product_id: ProductId::generate(),
            slug: "manipulado".to_owned(),
            name: "Manipulado".to_owned(),
            price: None,
            image_url: None,
            quantity: 1,
        });
        cart
    }

    #[test]
    fn test_link_encodes_message() {
        assert_eq!(
            link("+55 (75) 99135-7869", "Olá, tudo bem?"),
            "https://wa.me/5575991357869?text=Ol%C3%A1%2C%20tudo%20bem%3F"
        );
    }

    #[test]
    fn test_product_inquiry() {
        assert_eq!(product_inquiry(None, "Olá!", None), "Olá!");
        assert_eq!(
            product_inquiry(None, "Olá!", Some("Dipirona")),
            "Olá! Produto: Dipirona"
        );
        assert_eq!(
            product_inquiry(Some("Tem em estoque?"), "Olá!", Some("Dipirona")),
            "Tem em estoque? Produto: Dipirona"
        );
        assert_eq!(product_inquiry(Some("  "), "Olá!", None), "Olá!");
    }

    #[test]
    fn test_full_address_skips_blanks() {
        assert_eq!(full_address("Rua A, 10", "", "Casa 2"), "Rua A, 10, Casa 2");
        assert_eq!(full_address("Rua A", " Centro ", " "), "Rua A, Centro");
    }

    #[test]
    fn test_order_message_layout() {
        let cart = cart();
        let msg = OrderMessage {
            store_name: "Farmácia Mais Saúde",
            customer_name: "Maria",
            customer_phone: "(75) 99135-7869",
            full_address: "Rua A, 10, Centro",
            notes: Some("Entregar após as 18h"),
            cart: &cart,
        }
        .render();

        let expected = "🛒 *NOVO PEDIDO - Farmácia Mais Saúde*\n\n\
                        👤 *Cliente:* Maria\n\
                        📱 *Telefone:* (75) 99135-7869\n\
                        📍 *Endereço:* Rua A, 10, Centro\n\n\
                        📦 *Itens do Pedido:*\n\
                        • 2x Dipirona 500mg - R$ 17,98\n\
                        • 1x Manipulado - Sob consulta\n\n\
                        💰 *Total:* R$ 17,98\n\n\
                        📝 *Observações:* Entregar após as 18h\n\n\
                        _Pedido realizado pelo catálogo digital_";
        assert_eq!(msg, expected);
    }

    #[test]
    fn test_order_message_without_notes() {
        let cart = cart();
        let msg = OrderMessage {
            store_name: "Loja",
            customer_name: "João",
            customer_phone: "75991357869",
            full_address: "Rua B",
            notes: Some("   "),
            cart: &cart,
        };
        let text = msg.render();
        assert!(!text.contains("Observações"));
        assert!(text.ends_with("💰 *Total:* R$ 17,98\n\n_Pedido realizado pelo catálogo digital_"));
        assert!(msg.link("5575991357869").starts_with("https://wa.me/5575991357869?text=%F0%9F%9B%92"));
    }
}
