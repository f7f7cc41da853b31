//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Utc};

/// Store time zone (Bahia, UTC-3, no daylight saving).
const STORE_UTC_OFFSET_SECS: i32 = -3 * 60 * 60;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(Utc::now().year())
}

/// Formats stored phone digits for display, e.g. `(75) 99135-7869`.
///
/// Usage in templates: `{{ customer.phone|phone }}`
#[askama::filter_fn]
pub fn phone(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(mais_saude_core::types::phone::format_phone(&value.to_string()))
}

/// `dd/mm/aaaa hh:mm` in store time, for views built in handlers.
#[must_use]
pub fn local_datetime(at: &DateTime<Utc>) -> String {
    FixedOffset::east_opt(STORE_UTC_OFFSET_SECS).map_or_else(
        || at.format("%d/%m/%Y %H:%M").to_string(),
        |tz| at.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string(),
    )
}
