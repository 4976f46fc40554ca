//! Create a booking (PENDING) together with its payment (PENDING)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tracing::{info, warn};

use super::Operation;
use crate::application::rental::availability::AvailabilityGuard;
use crate::application::rental::clock::Clock;
use crate::domain::booking::pricing;
use crate::domain::{
    Booking, DomainError, DomainResult, NewBooking, Payment, Principal, RepositoryProvider,
    TimeRange,
};

#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    pub principal: Principal,
    pub vehicle_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub payment: Payment,
}

pub struct CreateBooking {
    repos: Arc<dyn RepositoryProvider>,
    guard: Arc<AvailabilityGuard>,
    clock: Arc<dyn Clock>,
}

impl CreateBooking {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        guard: Arc<AvailabilityGuard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repos, guard, clock }
    }
}

#[async_trait]
impl Operation for CreateBooking {
    type Input = CreateBookingInput;
    type Output = BookingReceipt;

    async fn execute(&self, input: CreateBookingInput) -> DomainResult<BookingReceipt> {
        // Stored timestamps have whole-second precision
        let range = TimeRange::new(
            input.start_time.trunc_subsecs(0),
            input.end_time.trunc_subsecs(0),
        )?;
        if range.start() < self.clock.now() {
            return Err(DomainError::PastStart);
        }

        let vehicle = self
            .repos
            .vehicles()
            .find_by_id(input.vehicle_id)
            .await?
            .filter(|v| v.is_active)
            .ok_or_else(|| DomainError::not_found("Vehicle", input.vehicle_id))?;

        let total_price = pricing::quote(&range, vehicle.price_per_hour)?;

        let new_booking = NewBooking {
            user_id: input.principal.user_id.clone(),
            contact_email: input.principal.email.clone(),
            vehicle_id: vehicle.id,
            range,
            total_price,
        };

        match self.guard.reserve(new_booking).await {
            Ok((booking, payment)) => {
                info!(
                    booking_id = booking.id,
                    payment_id = payment.id,
                    vehicle_id = vehicle.id,
                    user_id = %booking.user_id,
                    total_price = %booking.total_price,
                    "Booking created"
                );
                metrics::counter!("rental_bookings_created_total").increment(1);
                Ok(BookingReceipt { booking, payment })
            }
            Err(e @ DomainError::Conflict(_)) => {
                warn!(vehicle_id = vehicle.id, start = %range.start(), end = %range.end(), "Booking rejected: overlap");
                metrics::counter!("rental_booking_conflicts_total").increment(1);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
