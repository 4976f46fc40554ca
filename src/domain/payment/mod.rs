//! Payment aggregate (owned 1:1 by a booking)

pub mod model;
pub mod refund;
pub mod repository;

pub use model::{Payment, PaymentStatus, PaymentUpdate, RefundBreakdown};
pub use refund::{compute_refund, is_late_cancellation};
pub use repository::PaymentRepository;
