//! Outbound ports: collaborators the rental core calls out to
//!
//! [`BookingNotifier`] sends booking e-mails (best-effort). [`PaymentGateway`]
//! is the hosted-checkout provider; its webhook events arrive as
//! [`GatewayEvent`] after signature verification in the infrastructure layer.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{Booking, Vehicle};

// ── Notification sender ────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Notification transport failed: {0}")]
    Transport(String),
}

/// Sends booking notifications.
///
/// Callers treat every error as non-fatal.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn booking_confirmed(
        &self,
        booking: &Booking,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), NotificationError>;

    /// `refunded` is `Some` only when money was actually returned.
    async fn booking_cancelled(
        &self,
        booking: &Booking,
        vehicle: Option<&Vehicle>,
        refunded: Option<Decimal>,
    ) -> Result<(), NotificationError>;
}

// ── Payment gateway ────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Hosted checkout session request
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub booking_id: i32,
    pub payment_id: i32,
    /// Charge in the currency's smallest unit
    pub amount_minor: i64,
    pub currency: String,
    pub line_item_name: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Session issued by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Key handed to the browser to open the hosted checkout
    fn publishable_key(&self) -> &str;
}

/// Verified webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A checkout session was paid
    CheckoutCompleted {
        session_id: String,
        payment_id: Option<i32>,
        booking_id: Option<i32>,
        payment_intent: Option<String>,
    },
    /// Any event type the core does not act on
    Unknown { event_type: String },
}

impl GatewayEvent {
    pub fn event_type(&self) -> &str {
        match self {
            Self::CheckoutCompleted { .. } => "checkout.session.completed",
            Self::Unknown { event_type } => event_type,
        }
    }
}
