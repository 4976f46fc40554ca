//! Payment gateway adapters

pub mod stripe;
pub mod webhook;

pub use stripe::{StripeConfig, StripeGateway};
pub use webhook::{parse_event, SignatureError, WebhookVerifier, SIGNATURE_HEADER};
