//! Booking e-mails
//!
//! Messages are rendered here and handed to the log; an SMTP relay can be
//! plugged in behind the same [`BookingNotifier`] port.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::application::ports::{BookingNotifier, NotificationError};
use crate::domain::{Booking, Vehicle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn vehicle_label(booking: &Booking, vehicle: Option<&Vehicle>) -> String {
    vehicle
        .map(|v| v.display_name())
        .unwrap_or_else(|| format!("Vehicle #{}", booking.vehicle_id))
}

fn recipient(booking: &Booking) -> Result<String, NotificationError> {
    booking
        .contact_email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| {
            NotificationError::Rejected(format!("booking {} has no contact e-mail", booking.id))
        })
}

pub fn confirmation_email(
    booking: &Booking,
    vehicle: Option<&Vehicle>,
) -> Result<EmailMessage, NotificationError> {
    let label = vehicle_label(booking, vehicle);
    Ok(EmailMessage {
        to: recipient(booking)?,
        subject: format!("Booking Confirmed: {}", label),
        body: format!(
            "Your booking has been confirmed!\n\n\
             Vehicle: {}\nFrom: {}\nTo: {}\nTotal Price: ₹{}\n\n\
             Thank you for using ScootyGo!",
            label, booking.start_time, booking.end_time, booking.total_price
        ),
    })
}

pub fn cancellation_email(
    booking: &Booking,
    vehicle: Option<&Vehicle>,
    refunded: Option<Decimal>,
) -> Result<EmailMessage, NotificationError> {
    let label = vehicle_label(booking, vehicle);
    let mut body = "Your booking has been cancelled.\n".to_string();
    if let Some(amount) = refunded {
        body.push_str(&format!("Refund Amount: ₹{}\n\n", amount));
    }
    body.push_str("We hope to see you again soon!");
    Ok(EmailMessage {
        to: recipient(booking)?,
        subject: format!("Booking Cancelled: {}", label),
        body,
    })
}

/// Renders booking e-mails and records them in the log
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    fn deliver(&self, message: EmailMessage) {
        info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            "📧 E-mail queued"
        );
    }
}

#[async_trait]
impl BookingNotifier for LogMailer {
    async fn booking_confirmed(
        &self,
        booking: &Booking,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), NotificationError> {
        self.deliver(confirmation_email(booking, vehicle)?);
        Ok(())
    }

    async fn booking_cancelled(
        &self,
        booking: &Booking,
        vehicle: Option<&Vehicle>,
        refunded: Option<Decimal>,
    ) -> Result<(), NotificationError> {
        self.deliver(cancellation_email(booking, vehicle, refunded)?);
        Ok(())
    }
}
