//! Domain models for storefront.

pub mod customer;
pub mod session;

pub use customer::{Customer, CustomerProfile};
pub use session::{CurrentCustomer, keys as session_keys};
