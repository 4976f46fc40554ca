//! Booking aggregate
//!
//! Contains the Booking entity, its status machine, pricing, and the
//! repository interface.

pub mod model;
pub mod pricing;
pub mod repository;

pub use model::{Booking, BookingStatus, NewBooking, TimeRange};
pub use repository::BookingRepository;
