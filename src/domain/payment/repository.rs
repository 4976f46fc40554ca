//! Payment repository interface

use async_trait::async_trait;

use super::model::{Payment, PaymentUpdate};
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find payment by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Payment>>;

    /// Find the payment belonging to a booking
    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Option<Payment>>;

    /// Find the payment a checkout session was opened for
    async fn find_by_session(&self, session_id: &str) -> DomainResult<Option<Payment>>;

    /// Record the checkout session opened for a payment. Touches nothing
    /// else on the row.
    async fn attach_session(&self, payment_id: i32, session_id: &str) -> DomainResult<()>;

    /// Apply `update` if the stored status is one it expects.
    ///
    /// Returns `false` without writing when another writer already moved
    /// the payment on.
    async fn apply(&self, payment_id: i32, update: &PaymentUpdate) -> DomainResult<bool>;
}
