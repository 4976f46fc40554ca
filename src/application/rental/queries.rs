//! Read-side queries for vehicles and bookings

use std::sync::Arc;

use crate::domain::{
    Booking, DomainError, DomainResult, Payment, Principal, RepositoryProvider, Vehicle,
};

/// Booking with its payment and vehicle
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking: Booking,
    pub payment: Option<Payment>,
    pub vehicle: Option<Vehicle>,
}

pub struct RentalQueries {
    repos: Arc<dyn RepositoryProvider>,
}

impl RentalQueries {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Active vehicles, newest first
    pub async fn list_vehicles(&self) -> DomainResult<Vec<Vehicle>> {
        self.repos.vehicles().find_active().await
    }

    /// Inactive vehicles are reported as missing.
    pub async fn get_vehicle(&self, id: i32) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .filter(|v| v.is_active)
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    /// Own bookings for renters, every booking for staff
    pub async fn list_bookings(&self, principal: &Principal) -> DomainResult<Vec<Booking>> {
        if principal.is_staff() {
            self.repos.bookings().find_all().await
        } else {
            self.repos.bookings().find_for_user(&principal.user_id).await
        }
    }

    pub async fn list_all_bookings(&self, principal: &Principal) -> DomainResult<Vec<Booking>> {
        if !principal.is_staff() {
            return Err(DomainError::Forbidden("staff privilege required".to_string()));
        }
        self.repos.bookings().find_all().await
    }

    pub async fn get_booking(&self, principal: &Principal, id: i32) -> DomainResult<BookingDetails> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(id)
            .await?
            .filter(|b| b.is_owned_by(&principal.user_id) || principal.is_staff())
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        let payment = self.repos.payments().find_by_booking(booking.id).await?;
        let vehicle = self.repos.vehicles().find_by_id(booking.vehicle_id).await?;
        Ok(BookingDetails {
            booking,
            payment,
            vehicle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rental::test_support::{other_renter, renter, staff, TestEnv};

    #[tokio::test]
    async fn inactive_vehicles_are_hidden() {
        let env = TestEnv::new().await;
        assert_eq!(env.ops.queries.list_vehicles().await.unwrap().len(), 1);

        env.repos.vehicles().set_active(env.vehicle.id, false).await.unwrap();
        assert!(env.ops.queries.list_vehicles().await.unwrap().is_empty());
        assert!(matches!(
            env.ops.queries.get_vehicle(env.vehicle.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn renters_see_their_own_bookings_and_staff_see_all() {
        let env = TestEnv::new().await;
        let mine = env.book(renter(), 48, 2).await;
        env.book(other_renter(), 52, 2).await;

        let own = env.ops.queries.list_bookings(&renter()).await.unwrap();
        assert_eq!(own.iter().map(|b| b.id).collect::<Vec<_>>(), vec![mine.id]);
        assert_eq!(env.ops.queries.list_bookings(&staff()).await.unwrap().len(), 2);

        assert!(matches!(
            env.ops.queries.list_all_bookings(&renter()).await,
            Err(DomainError::Forbidden(_))
        ));
        let all = env.ops.queries.list_all_bookings(&staff()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id > all[1].id);
    }

    #[tokio::test]
    async fn details_are_visible_to_owner_and_staff_only() {
        let env = TestEnv::new().await;
        let booking = env.book(renter(), 48, 2).await;

        let details = env.ops.queries.get_booking(&renter(), booking.id).await.unwrap();
        assert_eq!(details.vehicle.unwrap().display_name(), "Honda Activa 6G");
        assert_eq!(details.payment.unwrap().amount, booking.total_price);

        assert!(env.ops.queries.get_booking(&staff(), booking.id).await.is_ok());
        assert!(matches!(
            env.ops.queries.get_booking(&other_renter(), booking.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
