//! Direct (manual / test) payment settlement

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::Operation;
use crate::application::rental::clock::Clock;
use crate::application::rental::notify::NotificationTrigger;
use crate::domain::{
    Booking, BookingStatus, DomainError, DomainResult, Payment, PaymentStatus, PaymentUpdate,
    Principal, RepositoryProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Success,
    Failure,
}

impl SettlementOutcome {
    /// Anything other than "failure" settles successfully.
    pub fn from_simulate(s: &str) -> Self {
        if s.eq_ignore_ascii_case("failure") || s.eq_ignore_ascii_case("failed") {
            Self::Failure
        } else {
            Self::Success
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettlePaymentInput {
    pub principal: Principal,
    pub booking_id: i32,
    pub outcome: SettlementOutcome,
}

#[derive(Debug, Clone)]
pub struct SettlementResult {
    pub booking: Booking,
    pub payment: Payment,
}

pub struct SettlePayment {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
    notifications: NotificationTrigger,
}

impl SettlePayment {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<dyn Clock>,
        notifications: NotificationTrigger,
    ) -> Self {
        Self {
            repos,
            clock,
            notifications,
        }
    }

    async fn reload_state_error(&self, booking_id: i32) -> DomainError {
        match self.repos.bookings().find_by_id(booking_id).await {
            Ok(Some(b)) => pending_expected(&b),
            Ok(None) => DomainError::not_found("Booking", booking_id),
            Err(e) => e,
        }
    }
}

fn pending_expected(booking: &Booking) -> DomainError {
    DomainError::InvalidState {
        entity: "Booking",
        actual: booking.status.to_string(),
        expected: "PENDING",
    }
}

#[async_trait]
impl Operation for SettlePayment {
    type Input = SettlePaymentInput;
    type Output = SettlementResult;

    async fn execute(&self, input: SettlePaymentInput) -> DomainResult<SettlementResult> {
        let repos = &self.repos;
        // Only the owner may settle; other callers learn nothing
        let mut booking = repos
            .bookings()
            .find_by_id(input.booking_id)
            .await?
            .filter(|b| b.is_owned_by(&input.principal.user_id))
            .ok_or_else(|| DomainError::not_found("Booking", input.booking_id))?;
        let mut payment = repos
            .payments()
            .find_by_booking(booking.id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Payment",
                field: "booking_id",
                value: booking.id.to_string(),
            })?;

        match input.outcome {
            SettlementOutcome::Success => {
                if payment.status == PaymentStatus::Success {
                    info!(booking_id = booking.id, payment_id = payment.id, "Payment already settled");
                    return Ok(SettlementResult { booking, payment });
                }
                if booking.status != BookingStatus::Pending {
                    return Err(pending_expected(&booking));
                }

                let update = PaymentUpdate::Succeeded {
                    transaction_id: Some(format!("MOCKTXN-{}-{}", payment.id, self.clock.now().timestamp())),
                    session_id: None,
                };
                let applied = repos
                    .bookings()
                    .transition(booking.id, BookingStatus::Pending, BookingStatus::Confirmed, Some((payment.id, &update)))
                    .await?;
                if !applied {
                    // A webhook may have settled it in the meantime
                    let settled = repos.payments().find_by_id(payment.id).await?.filter(|p| p.is_settled());
                    if let Some(settled) = settled {
                        if let Some(current) = repos.bookings().find_by_id(booking.id).await? {
                            info!(booking_id = booking.id, payment_id = settled.id, "Payment settled concurrently");
                            return Ok(SettlementResult {
                                booking: current,
                                payment: settled,
                            });
                        }
                    }
                    return Err(self.reload_state_error(booking.id).await);
                }
                update.apply_to(&mut payment);
                booking.status = BookingStatus::Confirmed;

                info!(booking_id = booking.id, payment_id = payment.id, "Payment settled, booking confirmed");
                metrics::counter!("rental_payments_settled_total", "source" => "direct", "outcome" => "success")
                    .increment(1);

                let vehicle = repos.vehicles().find_by_id(booking.vehicle_id).await.unwrap_or_else(|e| {
                    warn!(booking_id = booking.id, error = %e, "Vehicle lookup for notification failed");
                    None
                });
                self.notifications.booking_confirmed(&booking, vehicle.as_ref()).await;
            }
            SettlementOutcome::Failure => {
                if booking.status != BookingStatus::Pending {
                    return Err(pending_expected(&booking));
                }

                let update = PaymentUpdate::Failed;
                let applied = repos
                    .bookings()
                    .transition(booking.id, BookingStatus::Pending, BookingStatus::Cancelled, Some((payment.id, &update)))
                    .await?;
                if !applied {
                    return Err(self.reload_state_error(booking.id).await);
                }
                update.apply_to(&mut payment);
                booking.status = BookingStatus::Cancelled;

                info!(booking_id = booking.id, payment_id = payment.id, "Payment failed, booking cancelled");
                metrics::counter!("rental_payments_settled_total", "source" => "direct", "outcome" => "failure")
                    .increment(1);
            }
        }

        Ok(SettlementResult { booking, payment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rental::test_support::{other_renter, renter, staff, Sent, TestEnv};
    use crate::application::rental::operations::CancelBookingInput;

    fn settle(principal: Principal, booking_id: i32, outcome: SettlementOutcome) -> SettlePaymentInput {
        SettlePaymentInput {
            principal,
            booking_id,
            outcome,
        }
    }

    #[tokio::test]
    async fn success_confirms_booking_and_notifies() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;

        let result = env
            .ops
            .settle_payment
            .execute(settle(renter(), booking.id, SettlementOutcome::Success))
            .await
            .unwrap();

        assert_eq!(result.booking.status, BookingStatus::Confirmed);
        assert_eq!(result.payment.status, PaymentStatus::Success);
        let txn = result.payment.transaction_id.unwrap();
        assert!(txn.starts_with(&format!("MOCKTXN-{}-", result.payment.id)));
        assert_eq!(env.notifier.sent(), vec![Sent::Confirmed(booking.id)]);
    }

    #[tokio::test]
    async fn failure_cancels_booking_silently() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;

        let result = env
            .ops
            .settle_payment
            .execute(settle(renter(), booking.id, SettlementOutcome::Failure))
            .await
            .unwrap();

        assert_eq!(result.booking.status, BookingStatus::Cancelled);
        assert_eq!(result.payment.status, PaymentStatus::Failed);
        assert!(env.notifier.sent().is_empty());

        // The window is free again
        env.book(other_renter(), 48, 4).await;
    }

    #[tokio::test]
    async fn repeated_success_is_idempotent() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;
        env.confirm(renter(), booking.id).await;

        let again = env
            .ops
            .settle_payment
            .execute(settle(renter(), booking.id, SettlementOutcome::Success))
            .await
            .unwrap();
        assert_eq!(again.booking.status, BookingStatus::Confirmed);
        assert_eq!(env.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn only_the_owner_can_settle() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;

        for principal in [other_renter(), staff()] {
            let err = env
                .ops
                .settle_payment
                .execute(settle(principal, booking.id, SettlementOutcome::Success))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::NotFound { .. }));
        }
    }

    #[tokio::test]
    async fn cancelled_booking_cannot_be_settled() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;
        env.ops
            .cancel_booking
            .execute(CancelBookingInput {
                principal: renter(),
                booking_id: booking.id,
            })
            .await
            .unwrap();

        for outcome in [SettlementOutcome::Success, SettlementOutcome::Failure] {
            let err = env
                .ops
                .settle_payment
                .execute(settle(renter(), booking.id, outcome))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidState { .. }));
        }
    }

    #[test]
    fn simulate_flag_defaults_to_success() {
        assert_eq!(SettlementOutcome::from_simulate("success"), SettlementOutcome::Success);
        assert_eq!(SettlementOutcome::from_simulate(""), SettlementOutcome::Success);
        assert_eq!(SettlementOutcome::from_simulate("FAILURE"), SettlementOutcome::Failure);
    }
}
