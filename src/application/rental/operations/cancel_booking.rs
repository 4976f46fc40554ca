//! Cancel a booking, refunding a settled payment minus any late penalty

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::Operation;
use crate::application::rental::clock::Clock;
use crate::application::rental::notify::NotificationTrigger;
use crate::application::rental::policy::BookingPolicy;
use crate::domain::payment::{compute_refund, is_late_cancellation};
use crate::domain::{
    Booking, BookingStatus, DomainError, DomainResult, PaymentStatus, PaymentUpdate, Principal,
    RefundBreakdown, RepositoryProvider,
};

#[derive(Debug, Clone)]
pub struct CancelBookingInput {
    pub principal: Principal,
    pub booking_id: i32,
}

#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking: Booking,
    pub late: bool,
    pub refund: RefundBreakdown,
}

pub struct CancelBooking {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
    notifications: NotificationTrigger,
}

impl CancelBooking {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
        notifications: NotificationTrigger,
    ) -> Self {
        Self {
            repos,
            clock,
            policy,
            notifications,
        }
    }

    fn check_preconditions(&self, booking: &Booking, principal: &Principal) -> DomainResult<()> {
        if !(booking.is_owned_by(&principal.user_id) || principal.is_staff()) {
            return Err(DomainError::Forbidden(
                "only the booking owner or staff may cancel".to_string(),
            ));
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(DomainError::AlreadyCancelled(booking.id));
        }
        if booking.end_time < self.clock.now() {
            return Err(DomainError::PastBooking(booking.id));
        }
        if !booking.status.is_cancellable() {
            return Err(DomainError::InvalidState {
                entity: "Booking",
                actual: booking.status.to_string(),
                expected: "PENDING or CONFIRMED",
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Operation for CancelBooking {
    type Input = CancelBookingInput;
    type Output = CancellationOutcome;

    async fn execute(&self, input: CancelBookingInput) -> DomainResult<CancellationOutcome> {
        let repos = &self.repos;
        let mut booking = repos
            .bookings()
            .find_by_id(input.booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", input.booking_id))?;

        let mut retried = false;
        let (late, refund, refunded) = loop {
            self.check_preconditions(&booking, &input.principal)?;

            let now = self.clock.now();
            let late = is_late_cancellation(booking.start_time, now, self.policy.late_cancel_window);

            let mut refund = RefundBreakdown::none();
            let mut payment_change = None;
            if let Some(payment) = repos.payments().find_by_booking(booking.id).await? {
                if payment.status == PaymentStatus::Success {
                    refund = compute_refund(payment.amount, late, self.policy.penalty_rate);
                    let update = PaymentUpdate::Refunded {
                        breakdown: refund,
                        refund_id: format!("MOCKREF-{}-{}", payment.id, now.timestamp()),
                    };
                    payment_change = Some((payment.id, update));
                }
            }

            let applied = repos
                .bookings()
                .transition(
                    booking.id,
                    booking.status,
                    BookingStatus::Cancelled,
                    payment_change.as_ref().map(|(id, update)| (*id, update)),
                )
                .await?;
            if applied {
                break (late, refund, payment_change.is_some());
            }

            // Lost a race with another writer; a confirmation leaves the
            // booking cancellable, so try once more against the new state
            booking = repos
                .bookings()
                .find_by_id(booking.id)
                .await?
                .ok_or_else(|| DomainError::not_found("Booking", booking.id))?;
            if retried || !booking.status.is_cancellable() {
                return Err(match booking.status {
                    BookingStatus::Cancelled => DomainError::AlreadyCancelled(booking.id),
                    other => DomainError::InvalidState {
                        entity: "Booking",
                        actual: other.to_string(),
                        expected: "PENDING or CONFIRMED",
                    },
                });
            }
            retried = true;
        };
        booking.status = BookingStatus::Cancelled;

        info!(
            booking_id = booking.id,
            late,
            refunded = %refund.refunded,
            penalty = %refund.penalty,
            "Booking cancelled"
        );
        metrics::counter!("rental_bookings_cancelled_total", "late" => late.to_string())
            .increment(1);

        let vehicle = match repos.vehicles().find_by_id(booking.vehicle_id).await {
            Ok(v) => v,
            Err(e) => {
                warn!(booking_id = booking.id, error = %e, "Vehicle lookup for notification failed");
                None
            }
        };
        let refunded = refunded.then_some(refund.refunded);
        self.notifications
            .booking_cancelled(&booking, vehicle.as_ref(), refunded)
            .await;

        Ok(CancellationOutcome {
            booking,
            late,
            refund,
        })
    }
}
