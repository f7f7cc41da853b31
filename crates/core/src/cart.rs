//! Shopping cart held in the customer's session.
//!
//! The cart is a snapshot of what the customer picked: name, slug, price and
//! image are copied from the product when it is added, so rendering the cart
//! never needs a database round-trip.

use serde::{Deserialize, Serialize};

use crate::catalog::ProductWithRelations;
use crate::types::{Price, ProductId};

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product in the cart. `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot a product as a cart line.
    #[must_use]
    pub fn from_product(product: &ProductWithRelations, quantity: u32) -> Self {
        Self {
            product_id: product.product.id,
            slug: product.product.slug.clone(),
            name: product.product.name.clone(),
            price: product.product.price,
            image_url: product.primary_image().map(str::to_owned),
            quantity: quantity.clamp(1, MAX_LINE_QUANTITY),
        }
    }

    /// `price × quantity`, or `None` for products sold on request.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.price.map(|p| p.line_total(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a line, merging with an existing line for the same product.
    pub fn add(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .saturating_add(line.quantity)
                    .min(MAX_LINE_QUANTITY);
            }
            None => self.lines.push(CartLine {
                quantity: line.quantity.min(MAX_LINE_QUANTITY),
                ..line
            }),
        }
    }

    /// Drop a product from the cart. Returns whether it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Set a line's quantity; anything below 1 removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(MAX_LINE_QUANTITY)
            .min(MAX_LINE_QUANTITY);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `price × quantity`; products without a price count as zero.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().filter_map(CartLine::line_total).sum()
    }

    /// Whether any line is sold on request and so missing from the total.
    #[must_use]
    pub fn has_unpriced_lines(&self) -> bool {
        self.lines.iter().any(|l| l.price.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price_cents: Option<u32>, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::generate(),
            slug: "produto".to_owned(),
            name: "Produto".to_owned(),
            price: price_cents.map(Price::from_cents),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let l = line(Some(1000), 1);
        cart.add(l.clone());
        cart.add(CartLine { quantity: 2, ..l });
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_caps_quantity() {
        let mut cart = Cart::new();
        let l = line(Some(100), 90);
        cart.add(l.clone());
        cart.add(CartLine { quantity: 50, ..l });
        assert_eq!(cart.total_items(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_add_ignores_zero_quantity() {
        let mut cart = Cart::new();
        cart.add(line(Some(100), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut cart = Cart::new();
        let l = line(Some(500), 2);
        let id = l.product_id;
        cart.add(l);
        cart.set_quantity(id, 5);
        assert_eq!(cart.total_items(), 5);
        cart.set_quantity(id, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(line(Some(500), 2));
        cart.set_quantity(ProductId::generate(), 7);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_total_price_skips_unpriced() {
        let mut cart = Cart::new();
        cart.add(line(Some(1250), 2));
        cart.add(line(None, 3));
        cart.add(line(Some(99), 1));
        assert_eq!(cart.total_price(), Price::from_cents(2599));
        assert_eq!(cart.total_items(), 6);
        assert!(cart.has_unpriced_lines());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        let a = line(Some(100), 1);
        let a_id = a.product_id;
        cart.add(a);
        cart.add(line(Some(200), 1));
        assert!(cart.remove(a_id));
        assert!(!cart.remove(a_id));
        assert_eq!(cart.lines().len(), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_session_serialization_round_trip() {
        let mut cart = Cart::new();
        cart.add(line(Some(100), 2));
        let json = serde_json::to_value(&cart).ok();
        let back: Option<Cart> = json.and_then(|v| serde_json::from_value(v).ok());
        assert_eq!(back, Some(cart));
    }
}
