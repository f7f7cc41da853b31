//! Store-wide settings edited in the back-office.
//!
//! Settings are persisted as a JSON document. Every field has a default, so a
//! document missing some keys (or no document at all) still yields a complete
//! [`StoreSettings`]: stored values win, defaults fill the gaps. Merging is
//! per field, so one bad value only costs that field.

use std::mem::discriminant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which the settings document is stored.
pub const STORE_SETTINGS_KEY: &str = "store";

/// Validation failures when saving settings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("o nome da loja é obrigatório")]
    MissingStoreName,
    #[error("número de WhatsApp inválido: use DDI + DDD + número, só dígitos")]
    InvalidWhatsappNumber,
    #[error("cor principal inválida: use o formato #RRGGBB")]
    InvalidColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub store_name: String,
    pub store_description: String,
    /// Digits with country code, e.g. `5575991357869`.
    pub whatsapp_number: String,
    pub address: String,
    pub business_hours: String,
    pub primary_color: String,
    /// Default text of the WhatsApp contact buttons.
    pub welcome_message: String,
    pub order_confirmation_message: String,
    pub enable_whatsapp_orders: bool,
    pub show_prices: bool,
    pub show_stock: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Farmácia Mais Saúde".to_owned(),
            store_description:
                "Sua farmácia de confiança em Ipirá! Medicamentos, higiene, beleza e muito mais."
                    .to_owned(),
            whatsapp_number: "5575991357869".to_owned(),
            address: "Ipirá - Bahia".to_owned(),
            business_hours: "Seg a Sáb: 7h às 21h".to_owned(),
            primary_color: "#1e3a5f".to_owned(),
            welcome_message: "Olá! Bem-vindo à Farmácia Mais Saúde. Como posso ajudar?".to_owned(),
            order_confirmation_message:
                "Obrigado pelo seu pedido! Em breve entraremos em contato para confirmar."
                    .to_owned(),
            enable_whatsapp_orders: true,
            show_prices: true,
            show_stock: false,
        }
    }
}

impl StoreSettings {
    /// Build settings from a stored JSON document, filling missing keys with
    /// defaults.
    ///
    /// Each stored value replaces its default only when it has the same JSON
    /// type (string, bool). Mistyped or null values and unknown keys are
    /// skipped with a warning and the rest of the document still applies.
    #[must_use]
    pub fn from_stored(value: Option<Value>) -> Self {
        let stored = match value {
            None => return Self::default(),
            Some(Value::Object(stored)) => stored,
            Some(other) => {
                tracing::warn!(
                    kind = json_kind(&other),
                    "Store settings are not an object, using defaults"
                );
                return Self::default();
            }
        };
        let Ok(Value::Object(mut merged)) = serde_json::to_value(Self::default()) else {
            return Self::default();
        };

        for (key, stored_value) in stored {
            match merged.get(&key) {
                Some(default) if discriminant(default) == discriminant(&stored_value) => {
                    merged.insert(key, stored_value);
                }
                Some(_) => tracing::warn!(
                    key = %key,
                    kind = json_kind(&stored_value),
                    "Ignoring mistyped store setting"
                ),
                None => tracing::debug!(key = %key, "Ignoring unknown store setting"),
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    /// Check the fields a storefront cannot work without.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.store_name.trim().is_empty() {
            return Err(SettingsError::MissingStoreName);
        }
        let number = self.whatsapp_number.trim();
        if !(12..=13).contains(&number.len()) || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(SettingsError::InvalidWhatsappNumber);
        }
        let color = self.primary_color.trim();
        let hex = color.strip_prefix('#').unwrap_or_default();
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SettingsError::InvalidColor);
        }
        Ok(())
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_uses_defaults() {
        let settings = StoreSettings::from_stored(None);
        assert_eq!(settings.store_name, "Farmácia Mais Saúde");
        assert_eq!(settings.whatsapp_number, "5575991357869");
        assert!(settings.enable_whatsapp_orders);
        assert!(settings.show_prices);
        assert!(!settings.show_stock);
    }

    #[test]
    fn test_stored_values_merge_over_defaults() {
        let stored = serde_json::json!({
            "store_name": "Mais Saúde Centro",
            "show_prices": false
        });
        let settings = StoreSettings::from_stored(Some(stored));
        assert_eq!(settings.store_name, "Mais Saúde Centro");
        assert!(!settings.show_prices);
        assert_eq!(settings.address, "Ipirá - Bahia");
        assert_eq!(settings.primary_color, "#1e3a5f");
    }

    #[test]
    fn test_bad_field_keeps_the_others() {
        let stored = serde_json::json!({
            "store_name": "Mais Saúde Centro",
            "show_prices": "sim",
            "show_stock": true,
            "address": null,
            "whatsapp_number": 5575991357869_u64,
            "legacy_banner": "x"
        });
        let settings = StoreSettings::from_stored(Some(stored));

        assert_eq!(settings.store_name, "Mais Saúde Centro");
        assert!(settings.show_stock);
        assert!(settings.show_prices);
        assert_eq!(settings.address, "Ipirá - Bahia");
        assert_eq!(settings.whatsapp_number, "5575991357869");
    }

    #[test]
    fn test_non_object_document_falls_back() {
        let stored = serde_json::json!(["store_name"]);
        assert_eq!(StoreSettings::from_stored(Some(stored)), StoreSettings::default());
    }

    #[test]
    fn test_validate() {
        assert_eq!(StoreSettings::default().validate(), Ok(()));

        let mut s = StoreSettings::default();
        s.whatsapp_number = "(75) 99135".to_owned();
        assert_eq!(s.validate(), Err(SettingsError::InvalidWhatsappNumber));

        let mut s = StoreSettings::default();
        s.primary_color = "azul".to_owned();
        assert_eq!(s.validate(), Err(SettingsError::InvalidColor));

        let mut s = StoreSettings::default();
        s.store_name = "  ".to_owned();
        assert_eq!(s.validate(), Err(SettingsError::MissingStoreName));
    }
}
