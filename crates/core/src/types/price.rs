//! Brazilian real (BRL) prices using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10,2)` and rendered the way the store shows
//! them to customers: `R$ 1.234,56`. Products may have no price at all, in
//! which case the catalog shows [`PRICE_ON_REQUEST`].

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label shown instead of a price for products sold on request.
pub const PRICE_ON_REQUEST: &str = "Sob consulta";

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input could not be read as a number.
    #[error("preço inválido: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("o preço não pode ser negativo")]
    Negative,
}

/// A non-negative amount in Brazilian reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// R$ 0,00.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.round_dp(2)))
    }

    /// Create a price from an amount in centavos.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Parse a price typed into a form.
    ///
    /// Accepts both `1234.56` and the Brazilian `1.234,56`, with or without a
    /// leading `R$`. At most two decimal places are taken; longer fractions
    /// are rejected rather than rounded. A lone `.` followed by exactly three
    /// digits (`1.234`) could be either a thousands separator or a decimal
    /// point, so it is rejected too.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] when the text is not a number or is negative.
    pub fn parse_input(input: &str) -> Result<Self, PriceError> {
        let invalid = || PriceError::Invalid(input.trim().to_owned());

        let cleaned = input.trim().trim_start_matches("R$").trim();
        let (sign, unsigned) = cleaned
            .strip_prefix('-')
            .map_or(("", cleaned), |rest| ("-", rest.trim_start()));

        let (int_part, frac_part) = split_decimal(unsigned).ok_or_else(invalid)?;
        let int_digits = ungroup(int_part).ok_or_else(invalid)?;
        if frac_part.len() > 2 || !is_digits(frac_part) {
            return Err(invalid());
        }

        let frac = if frac_part.is_empty() { "0" } else { frac_part };
        let amount =
            Decimal::from_str(&format!("{sign}{int_digits}.{frac}")).map_err(|_| invalid())?;
        Self::new(amount)
    }

    /// Render as Brazilian currency, e.g. `R$ 1.234,56`.
    #[must_use]
    pub fn display(&self) -> String {
        let fixed = format!("{:.2}", self.0.round_dp(2));
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*ch);
        }

        format!("R$ {grouped},{frac_part}")
    }

    /// Render an optional price, falling back to [`PRICE_ON_REQUEST`].
    #[must_use]
    pub fn display_or_on_request(price: Option<Self>) -> String {
        price.map_or_else(|| PRICE_ON_REQUEST.to_owned(), |p| p.display())
    }
}

/// Split typed text at its decimal separator.
///
/// `,` is the separator whenever present, and nothing may follow it but
/// digits. Without a comma, a single `.` is the separator only when one or
/// two digits follow it; several dots are thousands separators.
fn split_decimal(text: &str) -> Option<(&str, &str)> {
    if let Some((int_part, frac_part)) = text.split_once(',') {
        return (!frac_part.contains([',', '.'])).then_some((int_part, frac_part));
    }
    match text.matches('.').count() {
        0 => Some((text, "")),
        1 => text
            .split_once('.')
            .filter(|(_, frac_part)| matches!(frac_part.len(), 1 | 2)),
        _ => Some((text, "")),
    }
}

/// Integer digits with optional `.` thousands separators in groups of three.
fn ungroup(int_part: &str) -> Option<String> {
    let mut groups = int_part.split('.');
    let first = groups.next()?;
    let grouped = int_part.contains('.');
    if first.is_empty() || !is_digits(first) || (grouped && first.len() > 3) {
        return None;
    }
    let mut digits = first.to_owned();
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

fn is_digits(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_small_amounts() {
        assert_eq!(Price::from_cents(0).display(), "R$ 0,00");
        assert_eq!(Price::from_cents(5).display(), "R$ 0,05");
        assert_eq!(Price::from_cents(1990).display(), "R$ 19,90");
    }

    #[test]
    fn test_display_thousands_grouping() {
        assert_eq!(Price::from_cents(123_456).display(), "R$ 1.234,56");
        assert_eq!(Price::from_cents(100_000_000).display(), "R$ 1.000.000,00");
        assert_eq!(Price::from_cents(99_999).display(), "R$ 999,99");
    }

    #[test]
    fn test_display_or_on_request() {
        assert_eq!(Price::display_or_on_request(None), "Sob consulta");
        assert_eq!(
            Price::display_or_on_request(Some(Price::from_cents(250))),
            "R$ 2,50"
        );
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative));
    }

    #[test]
    fn test_line_total_and_sum() {
        let unit = Price::from_cents(1250);
        assert_eq!(unit.line_total(3), Price::from_cents(3750));
        let total: Price = [unit, Price::from_cents(50)].into_iter().sum();
        assert_eq!(total, Price::from_cents(1300));
    }

    #[test]
    fn test_parse_input_formats() {
        assert_eq!(Price::parse_input("12.50").unwrap(), Price::from_cents(1250));
        assert_eq!(Price::parse_input("12,50").unwrap(), Price::from_cents(1250));
        assert_eq!(
            Price::parse_input("R$ 1.234,56").unwrap(),
            Price::from_cents(123_456)
        );
        assert!(matches!(
            Price::parse_input("doze"),
            Err(PriceError::Invalid(_))
        ));
        assert_eq!(Price::parse_input("-3"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_input_grouped_and_plain() {
        assert_eq!(Price::parse_input("12.5").unwrap(), Price::from_cents(1250));
        assert_eq!(Price::parse_input("12").unwrap(), Price::from_cents(1200));
        assert_eq!(Price::parse_input("1234,5").unwrap(), Price::from_cents(123_450));
        assert_eq!(
            Price::parse_input("1.234.567").unwrap(),
            Price::from_cents(123_456_700)
        );
        assert_eq!(
            Price::parse_input("R$1.234.567,89").unwrap(),
            Price::from_cents(123_456_789)
        );
    }

    #[test]
    fn test_parse_input_rejects_extra_decimal_places() {
        for input in ["12,345", "12.999", "0,001", "19,9999"] {
            assert!(
                matches!(Price::parse_input(input), Err(PriceError::Invalid(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_input_rejects_ambiguous_and_us_grouping() {
        for input in ["1.234", "1,234.56", "1.23,45", "12.34.56", "1,2,3", ",50", "12.", ""] {
            assert!(
                matches!(Price::parse_input(input), Err(PriceError::Invalid(_))),
                "{input}"
            );
        }
    }
}
