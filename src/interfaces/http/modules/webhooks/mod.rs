//! Payment gateway webhook receiver

pub mod handlers;

pub use handlers::*;
