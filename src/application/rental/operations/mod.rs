//! Rental use cases
//!
//! Each use case is an [`Operation`]: a plain input in, a typed output or
//! one [`DomainError`](crate::domain::DomainError) kind out. Transports
//! (HTTP handlers, webhooks, tooling) only build inputs and map results.

use async_trait::async_trait;

use crate::domain::DomainResult;

pub mod cancel_booking;
pub mod checkout;
pub mod create_booking;
pub mod gateway_event;
pub mod lifecycle;
pub mod settle_payment;

pub use cancel_booking::{CancelBooking, CancelBookingInput, CancellationOutcome};
pub use checkout::{CheckoutStarted, CreateCheckoutSession, CreateCheckoutSessionInput};
pub use create_booking::{BookingReceipt, CreateBooking, CreateBookingInput};
pub use gateway_event::{HandleGatewayEvent, WebhookDisposition};
pub use lifecycle::{AdvanceLifecycle, AdvanceLifecycleInput, LifecycleStep};
pub use settle_payment::{SettlePayment, SettlePaymentInput, SettlementOutcome, SettlementResult};

#[async_trait]
pub trait Operation: Send + Sync {
    type Input: Send + 'static;
    type Output: Send;

    async fn execute(&self, input: Self::Input) -> DomainResult<Self::Output>;
}
