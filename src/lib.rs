//! # ScootyGo rental service
//!
//! Scooter and bike rental backend: vehicle catalogue, bookings with
//! overlap protection, payments through a hosted checkout gateway, and
//! cancellation refunds with a late-cancellation penalty.
//!
//! ## Architecture
//!
//! - **domain**: entities, status machines, pricing and repository traits
//! - **application**: rental use cases and outbound ports
//! - **infrastructure**: SeaORM persistence, JWT, payment gateway, mail
//! - **interfaces**: axum REST API with Swagger documentation
//! - **shared**: error taxonomy and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, resolve_config_path, AppConfig};
pub use infrastructure::{connect_and_migrate, DatabaseConfig, SeaOrmRepositoryProvider};
pub use interfaces::http::create_api_router;
