//! Staff-driven lifecycle trigger (rental start / return)
//!
//! No timing logic: an external caller decides when a rental starts and
//! ends.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::Operation;
use crate::domain::{Booking, BookingStatus, DomainError, DomainResult, Principal, RepositoryProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    /// CONFIRMED → ONGOING
    Start,
    /// ONGOING → COMPLETED
    Complete,
}

impl LifecycleStep {
    fn target(&self) -> BookingStatus {
        match self {
            Self::Start => BookingStatus::Ongoing,
            Self::Complete => BookingStatus::Completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdvanceLifecycleInput {
    pub principal: Principal,
    pub booking_id: i32,
    pub step: LifecycleStep,
}

pub struct AdvanceLifecycle {
    repos: Arc<dyn RepositoryProvider>,
}

impl AdvanceLifecycle {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl Operation for AdvanceLifecycle {
    type Input = AdvanceLifecycleInput;
    type Output = Booking;

    async fn execute(&self, input: AdvanceLifecycleInput) -> DomainResult<Booking> {
        if !input.principal.is_staff() {
            return Err(DomainError::Forbidden("staff privilege required".to_string()));
        }

        let mut booking = self
            .repos
            .bookings()
            .find_by_id(input.booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", input.booking_id))?;

        let from = booking.status;
        let to = input.step.target();
        booking.transition_to(to)?;

        let applied = self.repos.bookings().transition(booking.id, from, to, None).await?;
        if !applied {
            return Err(DomainError::InvalidState {
                entity: "Booking",
                actual: "changed concurrently".to_string(),
                expected: from.as_str(),
            });
        }

        info!(booking_id = booking.id, from = %from, to = %to, "Booking lifecycle advanced");
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rental::test_support::{renter, staff, TestEnv};

    fn step(principal: Principal, booking_id: i32, step: LifecycleStep) -> AdvanceLifecycleInput {
        AdvanceLifecycleInput {
            principal,
            booking_id,
            step,
        }
    }

    #[tokio::test]
    async fn staff_walks_a_confirmed_booking_to_completed() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;
        env.confirm(renter(), booking.id).await;

        let started = env
            .ops
            .lifecycle
            .execute(step(staff(), booking.id, LifecycleStep::Start))
            .await
            .unwrap();
        assert_eq!(started.status, BookingStatus::Ongoing);

        let done = env
            .ops
            .lifecycle
            .execute(step(staff(), booking.id, LifecycleStep::Complete))
            .await
            .unwrap();
        assert_eq!(done.status, BookingStatus::Completed);

        // Completed bookings release the vehicle
        assert!(env
            .repos
            .bookings()
            .find_active_for_vehicle(env.vehicle.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn renters_cannot_drive_the_lifecycle() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;
        let err = env
            .ops
            .lifecycle
            .execute(step(renter(), booking.id, LifecycleStep::Start))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn steps_must_follow_the_status_machine() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 4).await;

        for s in [LifecycleStep::Start, LifecycleStep::Complete] {
            let err = env.ops.lifecycle.execute(step(staff(), booking.id, s)).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidState { .. }));
        }
    }
}
