pub mod mailer;

pub use mailer::{cancellation_email, confirmation_email, EmailMessage, LogMailer};
