//! Open a hosted checkout session for a pending booking

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::Operation;
use crate::application::ports::{CheckoutRequest, PaymentGateway};
use crate::application::rental::policy::CheckoutPolicy;
use crate::domain::money::to_minor_units;
use crate::domain::{BookingStatus, DomainError, DomainResult, Principal, RepositoryProvider};

#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionInput {
    pub principal: Principal,
    pub booking_id: i32,
}

#[derive(Debug, Clone)]
pub struct CheckoutStarted {
    pub booking_id: i32,
    pub payment_id: i32,
    pub session_id: String,
    pub checkout_url: Option<String>,
    pub publishable_key: String,
    pub amount_minor: i64,
    pub currency: String,
}

pub struct CreateCheckoutSession {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn PaymentGateway>,
    policy: CheckoutPolicy,
}

impl CreateCheckoutSession {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        gateway: Arc<dyn PaymentGateway>,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            repos,
            gateway,
            policy,
        }
    }
}

#[async_trait]
impl Operation for CreateCheckoutSession {
    type Input = CreateCheckoutSessionInput;
    type Output = CheckoutStarted;

    async fn execute(&self, input: CreateCheckoutSessionInput) -> DomainResult<CheckoutStarted> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(input.booking_id)
            .await?
            .filter(|b| b.is_owned_by(&input.principal.user_id))
            .ok_or_else(|| DomainError::not_found("Booking", input.booking_id))?;

        if booking.status != BookingStatus::Pending {
            return Err(DomainError::InvalidState {
                entity: "Booking",
                actual: booking.status.to_string(),
                expected: "PENDING",
            });
        }

        let payment = self
            .repos
            .payments()
            .find_by_booking(booking.id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Payment",
                field: "booking_id",
                value: booking.id.to_string(),
            })?;

        let amount_minor = to_minor_units(payment.amount, self.policy.subunit_factor)?;
        let vehicle_name = self
            .repos
            .vehicles()
            .find_by_id(booking.vehicle_id)
            .await?
            .map(|v| v.display_name())
            .unwrap_or_else(|| format!("Vehicle #{}", booking.vehicle_id));

        let request = CheckoutRequest {
            booking_id: booking.id,
            payment_id: payment.id,
            amount_minor,
            currency: self.policy.currency.clone(),
            line_item_name: format!("Booking #{} - {}", booking.id, vehicle_name),
            customer_email: booking.contact_email.clone(),
            success_url: self.policy.success_url.clone(),
            cancel_url: self.policy.cancel_url.clone(),
        };

        let session = self
            .gateway
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                error!(booking_id = booking.id, error = %e, "Checkout session creation failed");
                metrics::counter!("rental_checkout_sessions_total", "outcome" => "error").increment(1);
                DomainError::Gateway(e.to_string())
            })?;

        // Settlement may have landed during the gateway call; write the session only
        self.repos.payments().attach_session(payment.id, &session.id).await?;

        info!(
            booking_id = booking.id,
            payment_id = payment.id,
            session_id = %session.id,
            amount_minor,
            "Checkout session created"
        );
        metrics::counter!("rental_checkout_sessions_total", "outcome" => "created").increment(1);

        Ok(CheckoutStarted {
            booking_id: booking.id,
            payment_id: payment.id,
            session_id: session.id,
            checkout_url: session.url,
            publishable_key: self.gateway.publishable_key().to_string(),
            amount_minor,
            currency: self.policy.currency.clone(),
        })
    }
}
