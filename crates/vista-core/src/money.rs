//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    The server already sends prices as minor units (pence/cents).        │
//! │    They stay integers end to end; only display converts to majors.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Display
//! The storefront hands merchants a money format template such as
//! `£{{amount}} GBP`. [`MoneyFormat`] reproduces that template language;
//! [`Money::format`] is the shorthand used by the renderer (symbol + amount
//! from the snapshot's ISO-4217 code).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (pence for GBP).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support so wire payloads deserialize directly
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (pounds for GBP).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion, always 0-99 (absolute value).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if this is exactly zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Formats this value for display with the given ISO-4217 currency code.
    ///
    /// Known currencies render with their symbol (`£17.00`); unknown codes
    /// fall back to `CODE 17.00` rather than guessing a symbol. The currency
    /// always comes from the snapshot, never from the client.
    pub fn format(&self, currency: &str) -> String {
        let amount = group_thousands(self.0, 2, ",", ".");
        match currency_symbol(currency) {
            Some(sym) => format!("{}{}", sym, amount),
            None => format!("{} {}", currency, amount),
        }
    }

    /// Formats this value through a merchant money-format template.
    pub fn format_with(&self, format: &MoneyFormat) -> String {
        format.render(*self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major(), self.minor_part())
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

// =============================================================================
// Currency Symbols
// =============================================================================

/// Returns the display symbol for an ISO-4217 code, if we know it.
fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "GBP" => Some("£"),
        "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
        "EUR" => Some("€"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

// =============================================================================
// Merchant Format Templates
// =============================================================================

/// The placeholder styles a merchant money format can use.
///
/// Each variant controls decimals and separator characters; the surrounding
/// template text (symbol, trailing code) is carried through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountStyle {
    /// `{{amount}}` — 2 decimals, `1,234.56`
    Amount,
    /// `{{amount_no_decimals}}` — `1,234`
    NoDecimals,
    /// `{{amount_with_comma_separator}}` — `1.234,56`
    CommaSeparator,
    /// `{{amount_no_decimals_with_comma_separator}}` — `1.234`
    NoDecimalsCommaSeparator,
    /// `{{amount_with_apostrophe_separator}}` — `1'234.56`
    ApostropheSeparator,
}

/// A parsed merchant money-format template, e.g. `£{{amount}} GBP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    prefix: String,
    style: AmountStyle,
    suffix: String,
}

impl MoneyFormat {
    /// Parses a template string. A template without a recognized placeholder
    /// degrades to a bare `{{amount}}` with the whole input as prefix-less
    /// text, matching storefront behavior.
    pub fn parse(template: &str) -> Self {
        const PLACEHOLDERS: [(&str, AmountStyle); 5] = [
            (
                "{{amount_no_decimals_with_comma_separator}}",
                AmountStyle::NoDecimalsCommaSeparator,
            ),
            (
                "{{amount_with_comma_separator}}",
                AmountStyle::CommaSeparator,
            ),
            (
                "{{amount_with_apostrophe_separator}}",
                AmountStyle::ApostropheSeparator,
            ),
            ("{{amount_no_decimals}}", AmountStyle::NoDecimals),
            ("{{amount}}", AmountStyle::Amount),
        ];

        for (needle, style) in PLACEHOLDERS {
            if let Some(at) = template.find(needle) {
                return MoneyFormat {
                    prefix: template[..at].to_string(),
                    style,
                    suffix: template[at + needle.len()..].to_string(),
                };
            }
        }

        MoneyFormat {
            prefix: String::new(),
            style: AmountStyle::Amount,
            suffix: String::new(),
        }
    }

    fn render(&self, money: Money) -> String {
        let value = match self.style {
            AmountStyle::Amount => group_thousands(money.minor(), 2, ",", "."),
            AmountStyle::NoDecimals => group_thousands(money.minor(), 0, ",", "."),
            AmountStyle::CommaSeparator => group_thousands(money.minor(), 2, ".", ","),
            AmountStyle::NoDecimalsCommaSeparator => group_thousands(money.minor(), 0, ".", ","),
            AmountStyle::ApostropheSeparator => group_thousands(money.minor(), 2, "'", "."),
        };
        format!("{}{}{}", self.prefix, value, self.suffix)
    }
}

impl Default for MoneyFormat {
    fn default() -> Self {
        MoneyFormat::parse("{{amount}}")
    }
}

/// Renders minor units as a grouped decimal string.
///
/// `precision` 0 drops the decimal part after rounding toward zero on whole
/// majors; 2 keeps the exact minor part. Grouping applies to the major side
/// only.
fn group_thousands(minor: i64, precision: u32, thousands: &str, decimal: &str) -> String {
    let negative = minor < 0;
    let abs = minor.unsigned_abs();
    let majors = abs / 100;
    let minors = abs % 100;

    // Group the major digits from the right in blocks of three.
    let digits = majors.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let mut remaining = digits.len();
    for ch in digits.chars() {
        grouped.push(ch);
        remaining -= 1;
        if remaining > 0 && remaining % 3 == 0 {
            grouped.push_str(thousands);
        }
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if precision > 0 {
        out.push_str(decimal);
        out.push_str(&format!("{:02}", minors));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_roundtrip() {
        let price = Money::from_minor(1099);
        assert_eq!(price.minor(), 1099);
        assert_eq!(price.major(), 10);
        assert_eq!(price.minor_part(), 99);
    }

    #[test]
    fn test_addition() {
        let total = Money::from_minor(500) + Money::from_minor(1200);
        assert_eq!(total.minor(), 1700);
    }

    #[test]
    fn test_format_gbp() {
        // Scenario: subtotal of 1700 minor units in GBP renders as £17.00
        assert_eq!(Money::from_minor(1700).format("GBP"), "£17.00");
    }

    #[test]
    fn test_format_unknown_currency_falls_back_to_code() {
        assert_eq!(Money::from_minor(1700).format("SEK"), "SEK 17.00");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(Money::from_minor(123_456_789).format("USD"), "$1,234,567.89");
    }

    #[test]
    fn test_template_amount() {
        let fmt = MoneyFormat::parse("£{{amount}} GBP");
        assert_eq!(Money::from_minor(1234).format_with(&fmt), "£12.34 GBP");
    }

    #[test]
    fn test_template_no_decimals() {
        let fmt = MoneyFormat::parse("{{amount_no_decimals}}");
        assert_eq!(Money::from_minor(123_456).format_with(&fmt), "1,234");
    }

    #[test]
    fn test_template_comma_separator() {
        let fmt = MoneyFormat::parse("{{amount_with_comma_separator}}");
        assert_eq!(Money::from_minor(123_456).format_with(&fmt), "1.234,56");
    }

    #[test]
    fn test_template_apostrophe_separator() {
        let fmt = MoneyFormat::parse("{{amount_with_apostrophe_separator}}");
        assert_eq!(Money::from_minor(123_456).format_with(&fmt), "1'234.56");
    }

    #[test]
    fn test_template_without_placeholder_degrades_to_amount() {
        let fmt = MoneyFormat::parse("no placeholder here");
        assert_eq!(Money::from_minor(1234).format_with(&fmt), "12.34");
    }

    #[test]
    fn test_negative_money_display() {
        assert_eq!(Money::from_minor(-550).format("GBP"), "£-5.50");
    }
}
