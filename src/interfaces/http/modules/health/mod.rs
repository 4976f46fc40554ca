//! Liveness endpoint

pub mod handlers;

pub use handlers::*;
