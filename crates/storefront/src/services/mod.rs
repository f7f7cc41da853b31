//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration, login and profile updates (argon2)
//! - `checkout` - Order recording and the WhatsApp hand-off

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutDetails, CheckoutError, CheckoutService, PlacedOrder};
