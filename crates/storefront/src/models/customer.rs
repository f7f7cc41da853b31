//! Customer domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use mais_saude_core::whatsapp::full_address;
use mais_saude_core::{CustomerId, Email};

/// A customer account with its delivery profile.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    pub profile: CustomerProfile,
    pub created_at: DateTime<Utc>,
}

/// Contact and delivery details a customer can edit.
///
/// Empty strings mean "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerProfile {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub neighborhood: String,
    pub complement: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl CustomerProfile {
    /// Whether a delivery address has been saved.
    #[must_use]
    pub fn has_address(&self) -> bool {
        !self.address.trim().is_empty()
    }

    /// Address, neighborhood and complement joined for display.
    #[must_use]
    pub fn full_address(&self) -> String {
        full_address(&self.address, &self.neighborhood, &self.complement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_address() {
        let mut profile = CustomerProfile::default();
        assert!(!profile.has_address());
        profile.address = "   ".to_owned();
        assert!(!profile.has_address());
        profile.address = "Rua do Comércio, 45".to_owned();
        assert!(profile.has_address());
    }

    #[test]
    fn test_full_address() {
        let profile = CustomerProfile {
            address: "Rua do Comércio, 45".to_owned(),
            neighborhood: "Centro".to_owned(),
            ..CustomerProfile::default()
        };
        assert_eq!(profile.full_address(), "Rua do Comércio, 45, Centro");
    }
}
