//! Farmácia Mais Saúde back-office library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused (the CLI creates admin
//! accounts through [`services::AdminAuthService`]).
//!
//! # Security
//!
//! The back-office can edit the catalog, read every order with the
//! customer's phone and address, and change store settings. Sessions are
//! `SameSite=Strict` and every page requires a signed-in admin.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
