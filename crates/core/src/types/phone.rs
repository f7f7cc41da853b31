//! Brazilian phone numbers.
//!
//! Customers type phones in every shape (`(75) 99135-7869`, `75991357869`,
//! `+55 75 99135-7869`). Only the digits are kept so orders from the same
//! person group together in the back-office.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Brazil's country calling code.
pub const COUNTRY_CODE: &str = "55";

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// No digits were given.
    #[error("informe o telefone")]
    Empty,
    /// Wrong number of digits for a Brazilian phone.
    #[error("telefone deve ter DDD e número (10 ou 11 dígitos)")]
    InvalidLength,
}

/// A phone number stored as digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parse a phone from free-form input, keeping only the digits.
    ///
    /// Accepts 10 or 11 digit national numbers (DDD + number), optionally
    /// prefixed with the `55` country code.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError`] when there are no digits or the count is wrong.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !(10..=13).contains(&digits.len()) {
            return Err(PhoneError::InvalidLength);
        }
        Ok(Self(digits))
    }

    /// Digits as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The national part of the number (country code removed).
    #[must_use]
    pub fn national(&self) -> &str {
        if self.0.len() > 11 {
            self.0.strip_prefix(COUNTRY_CODE).unwrap_or(&self.0)
        } else {
            &self.0
        }
    }

    /// Digits as `wa.me` expects them, with the country code.
    #[must_use]
    pub fn whatsapp_digits(&self) -> String {
        format!("{COUNTRY_CODE}{}", self.national())
    }

    /// Human-friendly rendering: `(75) 99135-7869` or `(75) 3261-1234`.
    #[must_use]
    pub fn display(&self) -> String {
        format_digits(self.national())
    }
}

/// Format a raw phone string for display.
///
/// Used for phones stored before normalization; input that does not look like
/// a national number is returned unchanged.
#[must_use]
pub fn format_phone(raw: &str) -> String {
    Phone::parse(raw).map_or_else(|_| raw.to_owned(), |p| p.display())
}

fn format_digits(national: &str) -> String {
    match national.len() {
        11 | 10 => {
            let (ddd, rest) = national.split_at(2);
            let (head, tail) = rest.split_at(rest.len() - 4);
            format!("({ddd}) {head}-{tail}")
        }
        _ => national.to_owned(),
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_formatting() {
        let phone = Phone::parse("(75) 99135-7869").unwrap();
        assert_eq!(phone.as_str(), "75991357869");
    }

    #[test]
    fn test_display_mobile_and_landline() {
        assert_eq!(Phone::parse("75991357869").unwrap().display(), "(75) 99135-7869");
        assert_eq!(Phone::parse("7532611234").unwrap().display(), "(75) 3261-1234");
    }

    #[test]
    fn test_country_code_handling() {
        let phone = Phone::parse("+55 75 99135-7869").unwrap();
        assert_eq!(phone.national(), "75991357869");
        assert_eq!(phone.whatsapp_digits(), "5575991357869");
        assert_eq!(phone.display(), "(75) 99135-7869");

        let local = Phone::parse("75991357869").unwrap();
        assert_eq!(local.whatsapp_digits(), "5575991357869");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Phone::parse("abc"), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("12345"), Err(PhoneError::InvalidLength));
    }

    #[test]
    fn test_format_phone_passthrough() {
        assert_eq!(format_phone("75991357869"), "(75) 99135-7869");
        assert_eq!(format_phone("ramal 12"), "ramal 12");
    }
}
