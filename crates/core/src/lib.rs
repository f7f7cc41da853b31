//! Mais Saúde Core - Shared types and catalog logic.
//!
//! This crate provides the types used across all Mais Saúde components:
//! - `storefront` - Public pharmacy catalog with WhatsApp checkout
//! - `admin` - Back-office for products, orders, customers and settings
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no database access,
//! no HTTP clients. The one exception is [`config`], which reads environment
//! variables for the binaries. Both binaries share the same cart rules, price
//! formatting and WhatsApp message composition through it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, phones, slugs and statuses
//! - [`catalog`] - Catalog records (categories, products, orders, testimonials)
//! - [`config`] - Environment variable loading and secret checks
//! - [`cart`] - Shopping cart operations and totals
//! - [`settings`] - Store settings with their defaults
//! - [`whatsapp`] - `wa.me` links and order message composition

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod settings;
pub mod types;
pub mod whatsapp;

pub use cart::{Cart, CartLine};
pub use settings::StoreSettings;
pub use types::*;
