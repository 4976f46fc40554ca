//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::payment::PaymentRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::vehicle::VehicleRepository;
use crate::infrastructure::database::WriteGate;

use super::booking_repository::SeaOrmBookingRepository;
use super::payment_repository::SeaOrmPaymentRepository;
use super::vehicle_repository::SeaOrmVehicleRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
/// The repositories share one [`WriteGate`], so writes never contend inside
/// SQLite.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let vehicles = repos.vehicles().find_active().await?;
/// let payment = repos.payments().find_by_booking(42).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    vehicles: SeaOrmVehicleRepository,
    bookings: SeaOrmBookingRepository,
    payments: SeaOrmPaymentRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        let gate = WriteGate::new();
        Self {
            vehicles: SeaOrmVehicleRepository::new(db.clone(), gate.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone(), gate.clone()),
            payments: SeaOrmPaymentRepository::new(db, gate),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }
}
