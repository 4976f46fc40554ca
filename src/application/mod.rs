//! Application layer: outbound ports and the rental use cases

pub mod ports;
pub mod rental;

pub use ports::{BookingNotifier, GatewayEvent, PaymentGateway};
pub use rental::{BookingPolicy, CheckoutPolicy, Operation, RentalOperations};
