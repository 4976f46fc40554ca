//! Database entities module

pub mod booking;
pub mod payment;
pub mod vehicle;

pub use booking::Entity as Booking;
pub use payment::Entity as Payment;
pub use vehicle::Entity as Vehicle;
