//! Rental core: availability, lifecycle and payment settlement

pub mod availability;
pub mod clock;
pub mod notify;
pub mod operations;
pub mod policy;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

pub use availability::AvailabilityGuard;
pub use clock::{Clock, FixedClock, SystemClock};
pub use notify::NotificationTrigger;
pub use operations::*;
pub use policy::{BookingPolicy, CheckoutPolicy};
pub use queries::{BookingDetails, RentalQueries};

use crate::application::ports::{BookingNotifier, PaymentGateway};
use crate::domain::RepositoryProvider;

/// Every rental use case, wired to the same repositories and collaborators
pub struct RentalOperations {
    pub create_booking: CreateBooking,
    pub cancel_booking: CancelBooking,
    pub settle_payment: SettlePayment,
    pub checkout: CreateCheckoutSession,
    pub gateway_events: HandleGatewayEvent,
    pub lifecycle: AdvanceLifecycle,
    pub queries: RentalQueries,
}

impl RentalOperations {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn BookingNotifier>,
        gateway: Arc<dyn PaymentGateway>,
        booking_policy: BookingPolicy,
        checkout_policy: CheckoutPolicy,
    ) -> Self {
        let guard = Arc::new(AvailabilityGuard::new(repos.clone()));
        let notifications = NotificationTrigger::new(notifier);

        Self {
            create_booking: CreateBooking::new(repos.clone(), guard, clock.clone()),
            cancel_booking: CancelBooking::new(
                repos.clone(),
                clock.clone(),
                booking_policy,
                notifications.clone(),
            ),
            settle_payment: SettlePayment::new(repos.clone(), clock, notifications.clone()),
            checkout: CreateCheckoutSession::new(repos.clone(), gateway, checkout_policy),
            gateway_events: HandleGatewayEvent::new(repos.clone(), notifications),
            lifecycle: AdvanceLifecycle::new(repos.clone()),
            queries: RentalQueries::new(repos),
        }
    }
}
