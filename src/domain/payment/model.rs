//! Payment domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Money returned to the renter on cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundBreakdown {
    pub refunded: Decimal,
    pub penalty: Decimal,
}

impl RefundBreakdown {
    /// Nothing was paid, so nothing is refunded.
    pub fn none() -> Self {
        Self {
            refunded: Decimal::ZERO,
            penalty: Decimal::ZERO,
        }
    }
}

/// Payment for exactly one booking (same lifetime as the booking)
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: i32,
    pub booking_id: i32,
    pub amount: Decimal,
    pub status: PaymentStatus,
    /// Gateway transaction / payment-intent reference
    pub transaction_id: Option<String>,
    /// Checkout session issued by the gateway
    pub session_id: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refund_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Success
    }

    /// Record a successful capture. Returns `false` when the payment was
    /// already SUCCESS (nothing changes).
    pub fn mark_succeeded(&mut self, transaction_id: Option<String>) -> bool {
        if self.status == PaymentStatus::Success {
            return false;
        }
        self.status = PaymentStatus::Success;
        if transaction_id.is_some() {
            self.transaction_id = transaction_id;
        }
        true
    }

    pub fn mark_failed(&mut self) {
        self.status = PaymentStatus::Failed;
    }

    pub fn mark_refunded(&mut self, breakdown: RefundBreakdown, refund_id: String) {
        self.status = PaymentStatus::Refunded;
        self.refund_amount = Some(breakdown.refunded);
        self.refund_id = Some(refund_id);
    }
}

/// Targeted change to a stored payment.
///
/// Repositories write only the columns the change touches, and only while
/// the stored status is still one of [`PaymentUpdate::expected_from`]. A
/// concurrent writer that got there first is never overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentUpdate {
    Succeeded {
        transaction_id: Option<String>,
        /// Filled in only when the payment has no session yet
        session_id: Option<String>,
    },
    Failed,
    Refunded {
        breakdown: RefundBreakdown,
        refund_id: String,
    },
}

impl PaymentUpdate {
    pub fn expected_from(&self) -> &'static [PaymentStatus] {
        match self {
            Self::Succeeded { .. } => &[PaymentStatus::Pending, PaymentStatus::Failed],
            Self::Failed => &[PaymentStatus::Pending],
            Self::Refunded { .. } => &[PaymentStatus::Success],
        }
    }

    pub fn target(&self) -> PaymentStatus {
        match self {
            Self::Succeeded { .. } => PaymentStatus::Success,
            Self::Failed => PaymentStatus::Failed,
            Self::Refunded { .. } => PaymentStatus::Refunded,
        }
    }

    /// Mirror the change on an in-memory copy.
    pub fn apply_to(&self, payment: &mut Payment) {
        match self {
            Self::Succeeded {
                transaction_id,
                session_id,
            } => {
                payment.mark_succeeded(transaction_id.clone());
                if payment.session_id.is_none() {
                    payment.session_id = session_id.clone();
                }
            }
            Self::Failed => payment.mark_failed(),
            Self::Refunded {
                breakdown,
                refund_id,
            } => payment.mark_refunded(*breakdown, refund_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_payment() -> Payment {
        Payment {
            id: 3,
            booking_id: 1,
            amount: Decimal::new(20000, 2),
            status: PaymentStatus::Pending,
            transaction_id: None,
            session_id: None,
            refund_amount: None,
            refund_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn success_is_applied_once() {
        let mut p = pending_payment();
        assert!(p.mark_succeeded(Some("pi_1".into())));
        assert!(!p.mark_succeeded(Some("pi_2".into())));
        assert_eq!(p.transaction_id.as_deref(), Some("pi_1"));
        assert!(p.is_settled());
    }

    #[test]
    fn refund_records_amount_and_reference() {
        let mut p = pending_payment();
        p.mark_succeeded(None);
        p.mark_refunded(
            RefundBreakdown {
                refunded: Decimal::new(16000, 2),
                penalty: Decimal::new(4000, 2),
            },
            "MOCKREF-3-1".into(),
        );
        assert_eq!(p.status, PaymentStatus::Refunded);
        assert_eq!(p.refund_amount, Some(Decimal::new(16000, 2)));
        assert_eq!(p.refund_id.as_deref(), Some("MOCKREF-3-1"));
    }

    #[test]
    fn update_mirrors_on_the_copy_and_keeps_an_existing_session() {
        let mut p = pending_payment();
        p.session_id = Some("cs_first".into());
        let update = PaymentUpdate::Succeeded {
            transaction_id: Some("pi_9".into()),
            session_id: Some("cs_second".into()),
        };
        assert!(update.expected_from().contains(&p.status));
        update.apply_to(&mut p);
        assert_eq!(p.status, update.target());
        assert_eq!(p.transaction_id.as_deref(), Some("pi_9"));
        assert_eq!(p.session_id.as_deref(), Some("cs_first"));

        let refund = PaymentUpdate::Refunded {
            breakdown: RefundBreakdown::none(),
            refund_id: "MOCKREF-3-1".into(),
        };
        assert!(refund.expected_from().contains(&p.status));
        assert!(!PaymentUpdate::Failed.expected_from().contains(&p.status));
    }

    #[test]
    fn unknown_status_does_not_parse() {
        assert_eq!(PaymentStatus::parse("SUCCESS"), Some(PaymentStatus::Success));
        assert_eq!(PaymentStatus::parse("PAID"), None);
    }
}
