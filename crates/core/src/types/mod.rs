//! Core types for Mais Saúde.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod rating;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
pub use rating::{Rating, RatingError};
pub use slug::{Slug, SlugError};
pub use status::*;
