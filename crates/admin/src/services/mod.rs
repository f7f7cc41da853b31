//! Business logic services for the back-office.
//!
//! # Services
//!
//! - `auth` - Email and password sign-in, account creation
//! - `customers` - Customer list derived from order history

pub mod auth;
pub mod customers;

pub use auth::{AdminAuthService, AuthError};
pub use customers::{CustomerSummary, aggregate_customers, filter_customers};
