//! Fixed-point money helpers
//!
//! Amounts are `rust_decimal::Decimal` in the domain and persisted as
//! integer minor units with two decimal places.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::DomainResult;
use crate::shared::errors::DomainError;

/// Decimal places kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Round to the stored scale, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to stored minor units (cents / paise).
pub fn to_cents(amount: Decimal) -> DomainResult<i64> {
    to_minor_units(amount, 100)
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Convert an amount to the smallest unit of a currency, rounding to the
/// nearest integer.
pub fn to_minor_units(amount: Decimal, subunit_factor: i64) -> DomainResult<i64> {
    (amount * Decimal::from(subunit_factor))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| DomainError::Validation(format!("Amount {} is out of range", amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_roundtrip_keeps_two_places() {
        let amount = Decimal::new(20050, 2);
        assert_eq!(to_cents(amount).unwrap(), 20050);
        assert_eq!(from_cents(20050), amount);
    }

    #[test]
    fn minor_units_round_half_up() {
        // 10.005 INR -> 1000.5 paise -> 1001
        assert_eq!(to_minor_units(Decimal::new(10005, 3), 100).unwrap(), 1001);
        assert_eq!(to_minor_units(Decimal::new(10004, 3), 100).unwrap(), 1000);
    }

    #[test]
    fn three_digit_currency_factor() {
        assert_eq!(to_minor_units(Decimal::new(1234, 2), 1000).unwrap(), 12340);
    }

    #[test]
    fn round_money_is_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
    }
}
