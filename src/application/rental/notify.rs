//! Best-effort notification trigger
//!
//! Wraps the [`BookingNotifier`] port: every call is bounded by a timeout
//! and failures are logged, never returned.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};
use tokio::time::error::Elapsed;

use crate::application::ports::{BookingNotifier, NotificationError};
use crate::domain::{Booking, Vehicle};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct NotificationTrigger {
    notifier: Arc<dyn BookingNotifier>,
    timeout: Duration,
}

impl NotificationTrigger {
    pub fn new(notifier: Arc<dyn BookingNotifier>) -> Self {
        Self {
            notifier,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns whether the notification was delivered.
    pub async fn booking_confirmed(&self, booking: &Booking, vehicle: Option<&Vehicle>) -> bool {
        let result =
            tokio::time::timeout(self.timeout, self.notifier.booking_confirmed(booking, vehicle))
                .await;
        self.record(booking.id, "confirmed", result)
    }

    /// Returns whether the notification was delivered.
    pub async fn booking_cancelled(
        &self,
        booking: &Booking,
        vehicle: Option<&Vehicle>,
        refunded: Option<Decimal>,
    ) -> bool {
        let result = tokio::time::timeout(
            self.timeout,
            self.notifier.booking_cancelled(booking, vehicle, refunded),
        )
        .await;
        self.record(booking.id, "cancelled", result)
    }

    fn record(
        &self,
        booking_id: i32,
        kind: &'static str,
        result: Result<Result<(), NotificationError>, Elapsed>,
    ) -> bool {
        match result {
            Ok(Ok(())) => {
                info!(booking_id, kind, "Booking notification sent");
                metrics::counter!("rental_notifications_total", "kind" => kind, "outcome" => "sent")
                    .increment(1);
                true
            }
            Ok(Err(e)) => {
                warn!(booking_id, kind, error = %e, "Booking notification failed");
                metrics::counter!("rental_notifications_total", "kind" => kind, "outcome" => "failed")
                    .increment(1);
                false
            }
            Err(_) => {
                warn!(
                    booking_id,
                    kind,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Booking notification timed out"
                );
                metrics::counter!("rental_notifications_total", "kind" => kind, "outcome" => "timeout")
                    .increment(1);
                false
            }
        }
    }
}
