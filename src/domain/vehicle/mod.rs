//! Vehicle aggregate

pub mod model;
pub mod repository;

pub use model::{NewVehicle, Vehicle, VehicleType};
pub use repository::VehicleRepository;
