//! Per-resource HTTP modules

use std::sync::Arc;

use crate::application::rental::RentalOperations;

pub mod bookings;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod request_id;
pub mod vehicles;
pub mod webhooks;

/// State shared by the vehicle, booking and payment handlers
#[derive(Clone)]
pub struct RentalState {
    pub ops: Arc<RentalOperations>,
}
