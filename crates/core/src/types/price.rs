//! Type-safe price representation using decimal arithmetic.
//!
//! WooGraphQL returns money as strings. Asking for `format: RAW` yields plain
//! decimals (`"12.50"`), but some fields ignore the argument and return the
//! store-formatted value with HTML entities (`"&#36;12.50"`). Variable products
//! report their price as a range (`"10.00, 20.00"` or `"$10.00 - $20.00"`).
//! [`Price::parse`] and [`PriceRange::parse`] accept all of these.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input contained no digits.
    #[error("price is empty")]
    Empty,
    /// The digits could not be parsed as a decimal.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The currency code is not supported.
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(String),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a single WooGraphQL money string.
    ///
    /// HTML entities and currency symbols are stripped; thousands separators
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Empty`] when no digits remain and
    /// [`PriceError::Invalid`] when the remaining text is not a decimal.
    pub fn parse(raw: &str, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        let cleaned = clean_amount(raw);
        if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return Err(PriceError::Empty);
        }
        let amount =
            Decimal::from_str(&cleaned).map_err(|_| PriceError::Invalid(raw.to_string()))?;
        Ok(Self::new(amount, currency_code))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.amount.round_dp(2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}{:.2}", self.currency_code.symbol(), rounded.abs())
        } else {
            format!("{}{:.2}", self.currency_code.symbol(), rounded.abs())
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Price range for a product with variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest variation price.
    pub min: Price,
    /// Highest variation price.
    pub max: Price,
}

impl PriceRange {
    /// A range holding a single price.
    #[must_use]
    pub const fn single(price: Price) -> Self {
        Self {
            min: price,
            max: price,
        }
    }

    /// Parse a WooGraphQL price that may be a range.
    ///
    /// # Errors
    ///
    /// Returns an error if any component fails [`Price::parse`].
    pub fn parse(raw: &str, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        let parts: Vec<Price> = split_range(raw)
            .into_iter()
            .map(|part| Price::parse(part, currency_code))
            .collect::<Result<_, _>>()?;

        let min = parts
            .iter()
            .copied()
            .min_by(|a, b| a.amount.cmp(&b.amount))
            .ok_or(PriceError::Empty)?;
        let max = parts
            .iter()
            .copied()
            .max_by(|a, b| a.amount.cmp(&b.amount))
            .ok_or(PriceError::Empty)?;

        Ok(Self { min, max })
    }

    /// Whether min and max differ.
    #[must_use]
    pub fn is_range(&self) -> bool {
        self.min.amount != self.max.amount
    }

    /// Format for display ("$10.00" or "$10.00 – $20.00").
    #[must_use]
    pub fn display(&self) -> String {
        if self.is_range() {
            format!("{} – {}", self.min.display(), self.max.display())
        } else {
            self.min.display()
        }
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(PriceError::UnsupportedCurrency(other.to_string())),
        }
    }
}

/// Drop HTML entities, symbols and separators, keeping digits, `.` and `-`.
fn clean_amount(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            // Skip `&...;` entities such as `&#36;` or `&nbsp;`.
            for next in chars.by_ref() {
                if next == ';' {
                    break;
                }
            }
            continue;
        }
        if c.is_ascii_digit() || c == '.' || c == '-' {
            out.push(c);
        }
    }
    out
}

/// Split a range on `,` or a spaced dash, ignoring a leading minus sign
/// and thousands separators (`1,299.00`).
fn split_range(raw: &str) -> Vec<&str> {
    let separators: Vec<usize> = raw
        .char_indices()
        .filter(|&(i, c)| c == ',' && !is_thousands_separator(raw, i))
        .map(|(i, _)| i)
        .collect();
    if !separators.is_empty() {
        let mut parts = Vec::with_capacity(separators.len() + 1);
        let mut start = 0;
        for i in separators {
            parts.push(raw.get(start..i).unwrap_or_default());
            start = i + 1;
        }
        parts.push(raw.get(start..).unwrap_or_default());
        return parts.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect();
    }
    for separator in [" - ", " – ", "&ndash;"] {
        if raw.contains(separator) {
            return raw
                .split(separator)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    vec![raw.trim()]
}

/// A comma inside the integer part of one amount: digits before it (with no
/// decimal point since the amount started) and exactly three digits after.
fn is_thousands_separator(raw: &str, comma: usize) -> bool {
    let before = raw.get(..comma).unwrap_or_default();
    let after = raw.get(comma + 1..).unwrap_or_default();

    let integer_part: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if integer_part.is_empty() || integer_part.contains('.') {
        return false;
    }

    let mut digits = after.chars();
    digits.by_ref().take(3).filter(char::is_ascii_digit).count() == 3
        && !digits.next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(raw: &str) -> Price {
        Price::parse(raw, CurrencyCode::USD).unwrap()
    }

    #[test]
    fn test_parse_raw_decimal() {
        assert_eq!(usd("12.50").amount, Decimal::new(1250, 2));
        assert_eq!(usd("12.50").display(), "$12.50");
    }

    #[test]
    fn test_parse_formatted_with_entities() {
        assert_eq!(usd("&#36;1,299.00").amount, Decimal::new(129_900, 2));
        assert_eq!(usd("&nbsp;$5").display(), "$5.00");
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert_eq!(
            Price::parse("", CurrencyCode::USD),
            Err(PriceError::Empty)
        );
        assert_eq!(
            Price::parse("&#36;", CurrencyCode::USD),
            Err(PriceError::Empty)
        );
        assert!(matches!(
            Price::parse("1.2.3", CurrencyCode::USD),
            Err(PriceError::Invalid(_))
        ));
    }

    #[test]
    fn test_display_rounds_and_signs() {
        let price = Price::new(Decimal::new(-1999, 3), CurrencyCode::GBP);
        assert_eq!(price.display(), "-£2.00");
        assert_eq!(Price::zero(CurrencyCode::EUR).display(), "€0.00");
    }

    #[test]
    fn test_range_comma_separated() {
        let range = PriceRange::parse("20.00, 10.00", CurrencyCode::USD).unwrap();
        assert_eq!(range.min.amount, Decimal::new(1000, 2));
        assert_eq!(range.max.amount, Decimal::new(2000, 2));
        assert_eq!(range.display(), "$10.00 – $20.00");
    }

    #[test]
    fn test_range_dash_separated_and_single() {
        let range = PriceRange::parse("$10.00 - $12.00", CurrencyCode::USD).unwrap();
        assert!(range.is_range());

        let single = PriceRange::parse("9.99", CurrencyCode::USD).unwrap();
        assert!(!single.is_range());
        assert_eq!(single.display(), "$9.99");
    }

    #[test]
    fn test_range_ignores_thousands_separators() {
        let single = PriceRange::parse("&#36;1,299.00", CurrencyCode::USD).unwrap();
        assert!(!single.is_range());
        assert_eq!(single.display(), "$1299.00");
        assert_eq!(single.min, usd("&#36;1,299.00"));

        let range = PriceRange::parse("&#36;1,299.00, &#36;2,450.50", CurrencyCode::USD).unwrap();
        assert_eq!(range.min.amount, Decimal::new(129_900, 2));
        assert_eq!(range.max.amount, Decimal::new(245_050, 2));

        let unspaced = PriceRange::parse("10.00,200.00", CurrencyCode::USD).unwrap();
        assert!(unspaced.is_range());
        assert_eq!(unspaced.max.amount, Decimal::new(20_000, 2));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
