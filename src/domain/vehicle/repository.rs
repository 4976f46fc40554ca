//! Vehicle repository interface

use async_trait::async_trait;

use super::model::{NewVehicle, Vehicle};
use crate::domain::DomainResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Active vehicles, newest first
    async fn find_active(&self) -> DomainResult<Vec<Vehicle>>;

    /// Find vehicle by ID (active or not)
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>>;

    /// Register a new vehicle
    async fn save(&self, vehicle: NewVehicle) -> DomainResult<Vehicle>;

    /// Take a vehicle out of (or back into) service. Returns `false` if no
    /// vehicle has that ID.
    async fn set_active(&self, id: i32, active: bool) -> DomainResult<bool>;

    /// Total number of vehicles (any state)
    async fn count(&self) -> DomainResult<u64>;
}
