//! Domain models for the back-office.

pub mod admin_user;
pub mod catalog;
pub mod session;

pub use admin_user::{AdminRole, AdminUser};
pub use catalog::{CategoryDraft, CategoryForm, DraftError, ProductDraft, ProductForm};
pub use session::{CurrentAdmin, keys};
