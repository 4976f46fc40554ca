//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::booking::BookingRepository;
use super::payment::PaymentRepository;
use super::vehicle::VehicleRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let vehicle = repos.vehicles().find_by_id(7).await?;
///     let payment = repos.payments().find_by_booking(42).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn payments(&self) -> &dyn PaymentRepository;
}
