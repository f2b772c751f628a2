//! Money amounts using decimal arithmetic.
//!
//! The marketplace trades in Indian rupees. Amounts are stored as
//! `NUMERIC(10,2)` rupees and converted to paise only at the payment
//! gateway boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (rupees, not paise).
    pub amount: Decimal,
    pub currency_code: CurrencyCode,
}

impl Price {
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A rupee amount.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// Amount in the currency's minor unit, rounded to the nearest unit.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED).round().to_i64()
    }

    /// Format for display, e.g. `₹249.50`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount.round_dp(2))
    }
}

/// ISO 4217 currency codes accepted by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
}

impl CurrencyCode {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units() {
        assert_eq!(Price::inr(Decimal::new(24950, 2)).minor_units(), Some(24950));
        assert_eq!(Price::inr(Decimal::new(1, 3)).minor_units(), Some(0));
        assert_eq!(Price::inr(Decimal::new(999, 0)).minor_units(), Some(99900));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::inr(Decimal::new(2495, 1)).display(), "₹249.50");
        assert_eq!(
            Price::new(Decimal::new(5, 0), CurrencyCode::USD).display(),
            "$5.00"
        );
    }

    #[test]
    fn test_default_currency_is_rupee() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::INR);
        assert_eq!(CurrencyCode::INR.to_string(), "INR");
    }
}
