//! Availability guard
//!
//! Serialises check-and-create per vehicle. The in-process lock keeps two
//! requests for the same vehicle from racing; the repository's transaction,
//! opened under the SQLite write gate, makes check-and-insert atomic.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::{Booking, DomainResult, NewBooking, Payment, RepositoryProvider};

pub struct AvailabilityGuard {
    repos: Arc<dyn RepositoryProvider>,
    locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl AvailabilityGuard {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            locks: DashMap::new(),
        }
    }

    /// Exclusive lock on one vehicle. Other vehicles are not blocked.
    pub async fn lock_vehicle(&self, vehicle_id: i32) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(vehicle_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Reserve `booking` if no active booking on the vehicle overlaps it.
    ///
    /// Fails with `DomainError::Conflict` and writes nothing otherwise.
    pub async fn reserve(&self, booking: NewBooking) -> DomainResult<(Booking, Payment)> {
        let vehicle_id = booking.vehicle_id;
        let _guard = self.lock_vehicle(vehicle_id).await;
        debug!(vehicle_id, "Vehicle lock acquired");
        self.repos.bookings().reserve(booking).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::application::rental::test_support::TestEnv;

    #[tokio::test]
    async fn locks_are_per_vehicle() {
        let env = TestEnv::new().await;
        let guard = AvailabilityGuard::new(env.repos.clone());

        let held = guard.lock_vehicle(1).await;
        // A different vehicle is not blocked
        let other = tokio::time::timeout(Duration::from_millis(100), guard.lock_vehicle(2)).await;
        assert!(other.is_ok());
        // The same vehicle is
        let same = tokio::time::timeout(Duration::from_millis(100), guard.lock_vehicle(1)).await;
        assert!(same.is_err());

        drop(held);
        assert!(tokio::time::timeout(Duration::from_millis(100), guard.lock_vehicle(1))
            .await
            .is_ok());
    }
}
