//! Explicit rental policies, built from configuration at start-up

use chrono::Duration;
use rust_decimal::Decimal;

/// Cancellation rules
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// Cancelling this close to start (or later) is late
    pub late_cancel_window: Duration,
    /// Share of the paid amount withheld on a late cancellation
    pub penalty_rate: Decimal,
}

impl BookingPolicy {
    pub fn new(late_cancel_hours: i64, penalty_rate: Decimal) -> Self {
        Self {
            late_cancel_window: Duration::hours(late_cancel_hours),
            penalty_rate,
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::new(24, Decimal::new(20, 2))
    }
}

/// Hosted checkout parameters
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    /// ISO currency code, lower case
    pub currency: String,
    /// Smallest units per major unit (100 for INR/USD)
    pub subunit_factor: i64,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            currency: "inr".to_string(),
            subunit_factor: 100,
            success_url: "http://localhost:8080/payments/success".to_string(),
            cancel_url: "http://localhost:8080/payments/cancel".to_string(),
        }
    }
}
