//! Helpers for reading and writing the text columns SQLite stores amounts
//! and dates in.

use chrono::NaiveDate;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a stored amount, falling back to a float parse for values written
/// in scientific notation. Unreadable values load as zero.
pub fn parse_amount(value: &str, field_name: &str) -> Decimal {
    if let Ok(amount) = Decimal::from_str(value) {
        return amount;
    }
    match f64::from_str(value).ok().and_then(Decimal::from_f64) {
        Some(amount) => amount,
        None => {
            log::error!(
                "Failed to parse {} '{}' as a decimal. Falling back to ZERO.",
                field_name,
                value
            );
            Decimal::ZERO
        }
    }
}

/// Optional date column. Unreadable values are logged and read as absent.
pub fn parse_date(value: Option<&str>, field_name: &str) -> Option<NaiveDate> {
    let value = value?;
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("Ignoring unreadable {} '{}': {}", field_name, value, e);
            None
        }
    }
}

/// Required date column. The row is unusable without it.
pub fn read_date(value: &str, field_name: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        StorageError::CorruptValue(format!("{} '{}': {}", field_name, value, e))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_optional_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(format_date)
}
