//! Application ports (hexagonal architecture boundaries)
//!
//! Repository contracts live in `domain`; the outbound collaborators the
//! rental operations call are defined here.

pub mod outbound;

pub use outbound::{
    BookingNotifier, CheckoutRequest, CheckoutSession, GatewayError, GatewayEvent,
    NotificationError, PaymentGateway,
};
