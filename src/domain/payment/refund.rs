//! Cancellation refund rules

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::model::RefundBreakdown;
use crate::domain::money::round_money;

/// A cancellation is late when the booking starts within `window` of
/// `now`. Exactly `window` before start counts as late.
pub fn is_late_cancellation(start_time: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    start_time - now <= window
}

/// Split `amount` into refund and penalty. Late cancellations keep
/// `penalty_rate` of the amount.
pub fn compute_refund(amount: Decimal, late: bool, penalty_rate: Decimal) -> RefundBreakdown {
    let penalty = if late {
        round_money(amount * penalty_rate)
    } else {
        Decimal::ZERO
    };
    RefundBreakdown {
        refunded: amount - penalty,
        penalty,
    }
}
