//! Domain layer: vehicles, bookings, payments and the rules binding them

pub mod booking;
pub mod money;
pub mod payment;
pub mod principal;
pub mod repositories;
pub mod vehicle;

pub use booking::{Booking, BookingStatus, NewBooking, TimeRange};
pub use payment::{Payment, PaymentStatus, PaymentUpdate, RefundBreakdown};
pub use principal::{Principal, Role};
pub use repositories::{DomainResult, RepositoryProvider};
pub use vehicle::{NewVehicle, Vehicle, VehicleType};

pub use crate::shared::errors::DomainError;
