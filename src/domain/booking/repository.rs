//! Booking repository interface

use async_trait::async_trait;

use super::model::{Booking, BookingStatus, NewBooking};
use crate::domain::payment::{Payment, PaymentUpdate};
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Reserve the vehicle for `booking.range`.
    ///
    /// Within one database transaction: lock the vehicle row, reject the
    /// request with `DomainError::Conflict` if an active booking on the same
    /// vehicle overlaps, then insert the booking (PENDING) and its payment
    /// (PENDING, amount = total price). Nothing is written on failure.
    async fn reserve(&self, booking: NewBooking) -> DomainResult<(Booking, Payment)>;

    /// Find booking by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>>;

    /// All bookings, newest first
    async fn find_all(&self) -> DomainResult<Vec<Booking>>;

    /// Bookings created by `user_id`, newest first
    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>>;

    /// Bookings holding the vehicle (PENDING, CONFIRMED, ONGOING)
    async fn find_active_for_vehicle(&self, vehicle_id: i32) -> DomainResult<Vec<Booking>>;

    /// Compare-and-set the booking status, applying the payment change
    /// `(payment_id, update)` in the same transaction when given.
    ///
    /// Returns `false` without writing anything if the stored booking status
    /// is no longer `from` or the payment no longer accepts `update`.
    async fn transition(
        &self,
        booking_id: i32,
        from: BookingStatus,
        to: BookingStatus,
        payment: Option<(i32, &PaymentUpdate)>,
    ) -> DomainResult<bool>;
}
