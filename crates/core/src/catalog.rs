//! Catalog and order records shared by the storefront and the back-office.
//!
//! With the `postgres` feature each record derives `sqlx::FromRow`, so the
//! repositories in both binaries can read rows straight into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, CustomerId, OrderId, OrderItemId, OrderStatus, Price, ProductId, ProductImageId,
    Rating, RatingError, TestimonialId,
};

/// Payment method recorded for orders sent through WhatsApp.
pub const PAYMENT_METHOD_WHATSAPP: &str = "whatsapp";

/// Product category, listed by `sort` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub sort: i32,
}

/// A catalog product.
///
/// `price` is `None` for products sold on request ("Sob consulta").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub active: bool,
    pub category_id: Option<CategoryId>,
    /// Custom WhatsApp text for this product's "ask about it" button.
    pub whatsapp_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub url: String,
    pub sort: i32,
}

/// A product together with its category and images (ordered by `sort`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithRelations {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub images: Vec<ProductImage>,
}

impl ProductWithRelations {
    /// URL of the first image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }

    /// Image URLs in display order.
    #[must_use]
    pub fn image_urls(&self) -> Vec<&str> {
        self.images.iter().map(|img| img.url.as_str()).collect()
    }
}

/// An order recorded when a customer checks out through WhatsApp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    /// Digits only.
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl Order {
    /// Order number shown to staff: the first block of the UUID, uppercased.
    #[must_use]
    pub fn short_code(&self) -> String {
        self.id
            .to_string()
            .split('-')
            .next()
            .unwrap_or_default()
            .to_uppercase()
    }
}

/// A line of an order, with the price the customer saw at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    /// Product name at the time of purchase.
    pub product_name: String,
    #[cfg_attr(feature = "postgres", sqlx(try_from = "i32"))]
    pub quantity: u32,
    pub price_at_purchase: Price,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_at_purchase.line_total(self.quantity)
    }
}

/// An order line about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_purchase: Price,
}

/// An order about to be recorded, with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub payment_method: String,
    /// Signed-in customer who placed the order, if any.
    pub customer_id: Option<CustomerId>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Sum of `price_at_purchase × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items
            .iter()
            .map(|item| item.price_at_purchase.line_total(item.quantity))
            .sum()
    }
}

/// A customer review shown on the home page once approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Testimonial {
    pub id: TestimonialId,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    #[cfg_attr(feature = "postgres", sqlx(try_from = "i32"))]
    pub rating: Rating,
    pub comment: String,
    /// Approved and visible on the storefront.
    pub active: bool,
}

/// Validation failures for public feedback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TestimonialError {
    #[error("Nome é obrigatório (mínimo 2 caracteres)")]
    NameTooShort,
    #[error("Avaliação deve ser entre 1 e 5 estrelas")]
    InvalidRating(#[from] RatingError),
    #[error("Comentário é obrigatório (mínimo 10 caracteres)")]
    CommentTooShort,
}

/// Feedback that passed validation and can be stored for moderation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
    pub customer_name: String,
    pub rating: Rating,
    pub comment: String,
}

impl NewTestimonial {
    pub const MIN_NAME_CHARS: usize = 2;
    pub const MIN_COMMENT_CHARS: usize = 10;

    /// Validate a feedback submission, trimming name and comment.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule as a [`TestimonialError`].
    pub fn validate(name: &str, rating: i32, comment: &str) -> Result<Self, TestimonialError> {
        let name = name.trim();
        if name.chars().count() < Self::MIN_NAME_CHARS {
            return Err(TestimonialError::NameTooShort);
        }
        let rating = Rating::new(rating)?;
        let comment = comment.trim();
        if comment.chars().count() < Self::MIN_COMMENT_CHARS {
            return Err(TestimonialError::CommentTooShort);
        }
        Ok(Self {
            customer_name: name.to_owned(),
            rating,
            comment: comment.to_owned(),
        })
    }
}

/// Message returned after feedback is accepted.
pub const TESTIMONIAL_THANKS: &str =
    "Obrigado pelo seu feedback! Seu depoimento será publicado após aprovação.";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::generate(),
            created_at: Utc::now(),
            name: name.to_owned(),
            slug: "dipirona".to_owned(),
            description: None,
            price: Some(Price::from_cents(899)),
            active: true,
            category_id: None,
            whatsapp_message: None,
        }
    }

    #[test]
    fn test_testimonial_validation_trims() {
        let t = NewTestimonial::validate("  Ana ", 5, "  Atendimento excelente!  ").unwrap();
        assert_eq!(t.customer_name, "Ana");
        assert_eq!(t.comment, "Atendimento excelente!");
        assert_eq!(t.rating.get(), 5);
    }

    #[test]
    fn test_testimonial_validation_errors() {
        assert_eq!(
            NewTestimonial::validate(" A ", 5, "Muito bom atendimento"),
            Err(TestimonialError::NameTooShort)
        );
        assert!(matches!(
            NewTestimonial::validate("Ana", 0, "Muito bom atendimento"),
            Err(TestimonialError::InvalidRating(_))
        ));
        assert_eq!(
            NewTestimonial::validate("Ana", 4, "   curto   "),
            Err(TestimonialError::CommentTooShort)
        );
    }

    #[test]
    fn test_testimonial_error_messages_are_portuguese() {
        assert_eq!(
            TestimonialError::CommentTooShort.to_string(),
            "Comentário é obrigatório (mínimo 10 caracteres)"
        );
    }

    #[test]
    fn test_primary_image_uses_first_by_sort() {
        let p = product("Dipirona");
        let images = vec![
            ProductImage {
                id: ProductImageId::generate(),
                product_id: p.id,
                url: "https://cdn.example/a.jpg".to_owned(),
                sort: 0,
            },
            ProductImage {
                id: ProductImageId::generate(),
                product_id: p.id,
                url: "https://cdn.example/b.jpg".to_owned(),
                sort: 1,
            },
        ];
        let full = ProductWithRelations {
            product: p,
            category: None,
            images,
        };
        assert_eq!(full.primary_image(), Some("https://cdn.example/a.jpg"));
        assert_eq!(full.image_urls().len(), 2);
    }

    #[test]
    fn test_product_json_is_flat() {
        let full = ProductWithRelations {
            product: product("Dipirona"),
            category: None,
            images: vec![],
        };
        let json = serde_json::to_value(&full).unwrap();
        assert_eq!(json["name"], "Dipirona");
        assert!(json["images"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_new_order_total() {
        let item = |cents, quantity| NewOrderItem {
            product_id: None,
            product_name: "Item".to_owned(),
            quantity,
            price_at_purchase: Price::from_cents(cents),
        };
        let order = NewOrder {
            customer_name: "Maria".to_owned(),
            customer_phone: "75991357869".to_owned(),
            customer_address: None,
            notes: None,
            status: OrderStatus::Pending,
            payment_method: PAYMENT_METHOD_WHATSAPP.to_owned(),
            customer_id: None,
            items: vec![item(1000, 2), item(0, 5), item(350, 1)],
        };
        assert_eq!(order.total(), Price::from_cents(2350));
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: OrderItemId::generate(),
            order_id: OrderId::generate(),
            product_id: None,
            product_name: "Soro".to_owned(),
            quantity: 4,
            price_at_purchase: Price::from_cents(250),
        };
        assert_eq!(item.line_total(), Price::from_cents(1000));
    }
}
