//! Rental price calculation
//!
//! Partial hours are billed as full hours: 1h30m at 100/h costs 200.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::model::TimeRange;
use crate::domain::money::round_money;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Number of billable hours in a range, rounded up.
pub fn billable_hours(range: &TimeRange) -> i64 {
    let millis = range.duration().num_milliseconds();
    (millis + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR
}

/// Price of `range` at `hourly_rate`.
pub fn quote(range: &TimeRange, hourly_rate: Decimal) -> DomainResult<Decimal> {
    if hourly_rate.is_sign_negative() {
        return Err(DomainError::Validation(
            "Hourly rate cannot be negative".to_string(),
        ));
    }
    Ok(round_money(hourly_rate * Decimal::from(billable_hours(range))))
}

/// Price of `[start, end)` at `hourly_rate`; fails with `InvalidRange`
/// when `end <= start`.
pub fn price_for(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    hourly_rate: Decimal,
) -> DomainResult<Decimal> {
    quote(&TimeRange::new(start, end)?, hourly_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn partial_hour_rounds_up() {
        let price = price_for(start(), start() + Duration::minutes(90), Decimal::from(100)).unwrap();
        assert_eq!(price, Decimal::from(200));
    }

    #[test]
    fn exact_hours_are_not_over_rounded() {
        let price = price_for(start(), start() + Duration::hours(2), Decimal::from(100)).unwrap();
        assert_eq!(price, Decimal::from(200));
    }

    #[test]
    fn one_second_costs_a_full_hour() {
        let price = price_for(start(), start() + Duration::seconds(1), Decimal::new(4950, 2)).unwrap();
        assert_eq!(price, Decimal::new(4950, 2));
    }

    #[test]
    fn four_hours_at_fifty() {
        let price = price_for(start(), start() + Duration::hours(4), Decimal::from(50)).unwrap();
        assert_eq!(price, Decimal::new(20000, 2));
    }

    #[test]
    fn empty_or_inverted_range_is_invalid() {
        assert!(matches!(
            price_for(start(), start(), Decimal::from(100)),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(
            price_for(start(), start() - Duration::hours(1), Decimal::from(100)),
            Err(DomainError::InvalidRange(_))
        ));
    }

    #[test]
    fn negative_rate_rejected() {
        let range = TimeRange::new(start(), start() + Duration::hours(1)).unwrap();
        assert!(quote(&range, Decimal::from(-1)).is_err());
    }

    #[test]
    fn zero_rate_is_free() {
        let range = TimeRange::new(start(), start() + Duration::hours(3)).unwrap();
        assert_eq!(quote(&range, Decimal::ZERO).unwrap(), Decimal::ZERO);
    }
}
