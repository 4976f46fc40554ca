//! Payment DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::rental::{CheckoutStarted, SettlementResult};
use crate::interfaces::http::modules::bookings::{BookingDto, PaymentDto};

fn default_simulate() -> String {
    "success".to_string()
}

/// Settle a booking's payment without a gateway
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MockPaymentRequest {
    /// `success` (default) or `failure`
    #[serde(default = "default_simulate")]
    #[validate(length(min = 1, max = 16))]
    pub simulate: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MockPaymentResponse {
    pub booking: BookingDto,
    pub payment: PaymentDto,
}

impl From<SettlementResult> for MockPaymentResponse {
    fn from(r: SettlementResult) -> Self {
        Self {
            booking: r.booking.into(),
            payment: r.payment.into(),
        }
    }
}

/// Hosted checkout session opened with the gateway
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub booking_id: i32,
    pub payment_id: i32,
    pub session_id: String,
    pub checkout_url: Option<String>,
    pub publishable_key: String,
    /// Amount in currency subunits
    pub amount: i64,
    pub currency: String,
}

impl From<CheckoutStarted> for CheckoutResponse {
    fn from(c: CheckoutStarted) -> Self {
        Self {
            booking_id: c.booking_id,
            payment_id: c.payment_id,
            session_id: c.session_id,
            checkout_url: c.checkout_url,
            publishable_key: c.publishable_key,
            amount: c.amount_minor,
            currency: c.currency,
        }
    }
}
