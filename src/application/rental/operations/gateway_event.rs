//! Apply verified payment-gateway webhook events
//!
//! The gateway has already committed on its side, so nothing here is
//! surfaced back to it: unknown payments and unknown event types are
//! logged and acknowledged. Replays are no-ops.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::Operation;
use crate::application::ports::GatewayEvent;
use crate::application::rental::notify::NotificationTrigger;
use crate::domain::{
    BookingStatus, DomainResult, Payment, PaymentStatus, PaymentUpdate, RepositoryProvider,
};

/// What the event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookDisposition {
    /// Payment settled and booking confirmed
    Confirmed { booking_id: i32 },
    /// Payment settled but the booking had already moved on
    PaymentRecorded { booking_id: i32 },
    /// Payment was already SUCCESS or REFUNDED
    AlreadySettled,
    /// No payment matches the event
    UnknownPayment,
    /// Event type the core does not act on
    Ignored,
}

pub struct HandleGatewayEvent {
    repos: Arc<dyn RepositoryProvider>,
    notifications: NotificationTrigger,
}

impl HandleGatewayEvent {
    pub fn new(repos: Arc<dyn RepositoryProvider>, notifications: NotificationTrigger) -> Self {
        Self {
            repos,
            notifications,
        }
    }

    async fn locate_payment(
        &self,
        payment_id: Option<i32>,
        session_id: &str,
    ) -> DomainResult<Option<Payment>> {
        if let Some(id) = payment_id {
            return self.repos.payments().find_by_id(id).await;
        }
        self.repos.payments().find_by_session(session_id).await
    }

    async fn checkout_completed(
        &self,
        payment_id: Option<i32>,
        session_id: &str,
        payment_intent: Option<String>,
    ) -> DomainResult<WebhookDisposition> {
        let Some(payment) = self.locate_payment(payment_id, session_id).await? else {
            warn!(?payment_id, session_id, "Webhook references unknown payment, discarding");
            return Ok(WebhookDisposition::UnknownPayment);
        };

        if matches!(payment.status, PaymentStatus::Success | PaymentStatus::Refunded) {
            info!(payment_id = payment.id, status = %payment.status, "Webhook replay ignored");
            return Ok(WebhookDisposition::AlreadySettled);
        }

        let update = PaymentUpdate::Succeeded {
            transaction_id: payment_intent,
            session_id: Some(session_id.to_string()),
        };
        let payment_id = payment.id;
        let booking_id = payment.booking_id;
        let booking = self.repos.bookings().find_by_id(booking_id).await?;

        match booking {
            Some(mut booking) if booking.status == BookingStatus::Pending => {
                let applied = self
                    .repos
                    .bookings()
                    .transition(booking_id, BookingStatus::Pending, BookingStatus::Confirmed, Some((payment_id, &update)))
                    .await?;
                if !applied {
                    // Booking or payment moved on concurrently
                    warn!(booking_id, payment_id, "Booking changed before confirmation");
                    return self.record_only(payment_id, booking_id, &update).await;
                }
                booking.status = BookingStatus::Confirmed;

                info!(booking_id, payment_id, "Webhook confirmed booking");
                metrics::counter!("rental_payments_settled_total", "source" => "webhook", "outcome" => "success")
                    .increment(1);

                let vehicle = self.repos.vehicles().find_by_id(booking.vehicle_id).await.unwrap_or_else(|e| {
                    warn!(booking_id, error = %e, "Vehicle lookup for notification failed");
                    None
                });
                self.notifications.booking_confirmed(&booking, vehicle.as_ref()).await;
                Ok(WebhookDisposition::Confirmed { booking_id })
            }
            Some(booking) => {
                warn!(
                    booking_id,
                    payment_id,
                    booking_status = %booking.status,
                    "Payment for booking that is no longer pending"
                );
                self.record_only(payment_id, booking_id, &update).await
            }
            None => {
                warn!(booking_id, payment_id, "Payment for missing booking");
                self.record_only(payment_id, booking_id, &update).await
            }
        }
    }

    /// Settle the payment alone. A payment another writer already settled
    /// is left as it is.
    async fn record_only(
        &self,
        payment_id: i32,
        booking_id: i32,
        update: &PaymentUpdate,
    ) -> DomainResult<WebhookDisposition> {
        if self.repos.payments().apply(payment_id, update).await? {
            info!(booking_id, payment_id, "Payment recorded without confirming booking");
            Ok(WebhookDisposition::PaymentRecorded { booking_id })
        } else {
            info!(booking_id, payment_id, "Payment already settled");
            Ok(WebhookDisposition::AlreadySettled)
        }
    }
}

#[async_trait]
impl Operation for HandleGatewayEvent {
    type Input = GatewayEvent;
    type Output = WebhookDisposition;

    async fn execute(&self, event: GatewayEvent) -> DomainResult<WebhookDisposition> {
        match event {
            GatewayEvent::CheckoutCompleted {
                session_id,
                payment_id,
                booking_id,
                payment_intent,
            } => {
                info!(session_id = %session_id, ?payment_id, ?booking_id, "Checkout completed event");
                self.checkout_completed(payment_id, &session_id, payment_intent).await
            }
            GatewayEvent::Unknown { event_type } => {
                info!(event_type = %event_type, "Ignoring gateway event");
                Ok(WebhookDisposition::Ignored)
            }
        }
    }
}
