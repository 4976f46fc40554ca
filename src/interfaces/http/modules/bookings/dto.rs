//! Booking DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::rental::{BookingDetails, BookingReceipt, CancellationOutcome};
use crate::domain::{Booking, Payment};

/// Request to book a vehicle for `[start_time, end_time)`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "must be a positive vehicle id"))]
    pub vehicle_id: i32,
    /// RFC 3339 timestamp, truncated to whole seconds
    pub start_time: DateTime<Utc>,
    /// Exclusive end of the rental window
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: i32,
    pub user_id: String,
    pub vehicle_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[schema(value_type = String, example = "200.00")]
    pub total_price: Decimal,
    /// PENDING | CONFIRMED | ONGOING | COMPLETED | CANCELLED
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            vehicle_id: b.vehicle_id,
            start_time: b.start_time,
            end_time: b.end_time,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDto {
    pub id: i32,
    pub booking_id: i32,
    #[schema(value_type = String, example = "200.00")]
    pub amount: Decimal,
    /// PENDING | SUCCESS | FAILED | REFUNDED
    pub status: String,
    pub transaction_id: Option<String>,
    pub session_id: Option<String>,
    #[schema(value_type = Option<String>)]
    pub refund_amount: Option<Decimal>,
    pub refund_id: Option<String>,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            amount: p.amount,
            status: p.status.as_str().to_string(),
            transaction_id: p.transaction_id,
            session_id: p.session_id,
            refund_amount: p.refund_amount,
            refund_id: p.refund_id,
        }
    }
}

/// Newly created booking with its pending payment
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateBookingResponse {
    pub booking: BookingDto,
    pub payment: PaymentDto,
}

impl From<BookingReceipt> for CreateBookingResponse {
    fn from(r: BookingReceipt) -> Self {
        Self {
            booking: r.booking.into(),
            payment: r.payment.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetailDto {
    pub booking: BookingDto,
    /// "Brand Model" of the booked vehicle
    pub vehicle_display: Option<String>,
    pub payment: Option<PaymentDto>,
}

impl From<BookingDetails> for BookingDetailDto {
    fn from(d: BookingDetails) -> Self {
        Self {
            vehicle_display: d.vehicle.as_ref().map(|v| v.display_name()),
            booking: d.booking.into(),
            payment: d.payment.map(PaymentDto::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelBookingResponse {
    pub booking_id: i32,
    pub status: String,
    /// Cancelled within the late window before start
    pub late_cancellation: bool,
    #[schema(value_type = String, example = "160.00")]
    pub refund_amount: Decimal,
    #[schema(value_type = String, example = "40.00")]
    pub penalty_amount: Decimal,
}

impl From<CancellationOutcome> for CancelBookingResponse {
    fn from(o: CancellationOutcome) -> Self {
        Self {
            booking_id: o.booking.id,
            status: o.booking.status.as_str().to_string(),
            late_cancellation: o.late,
            refund_amount: o.refund.refunded,
            penalty_amount: o.refund.penalty,
        }
    }
}
