//! Farmácia Mais Saúde storefront library.
//!
//! Public catalog, session cart, customer accounts and the WhatsApp
//! checkout. Exposed as a library so the binary and tests share it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
