//! Booking domain entity and status machine

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Booking status
///
/// ```text
/// PENDING ──payment ok──▶ CONFIRMED ──start──▶ ONGOING ──complete──▶ COMPLETED
///    │                        │
///    └──cancel / payment failed┴──────────────▶ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Ongoing,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Statuses that hold the vehicle for their time range
    pub const ACTIVE: [BookingStatus; 3] = [Self::Pending, Self::Confirmed, Self::Ongoing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Ongoing => "ONGOING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "ONGOING" => Some(Self::Ongoing),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Ongoing)
                | (Confirmed, Cancelled)
                | (Ongoing, Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Half-open rental window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end <= start {
            return Err(DomainError::InvalidRange(
                "end_time must be after start_time".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Touching ranges (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// A reservation of one vehicle by one user
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i32,
    /// Subject of the principal that created the booking
    pub user_id: String,
    /// Where booking notifications go
    pub contact_email: Option<String>,
    pub vehicle_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DomainResult<TimeRange> {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Move to `next`, rejecting transitions the status machine forbids.
    pub fn transition_to(&mut self, next: BookingStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidState {
                entity: "Booking",
                actual: self.status.to_string(),
                expected: expected_for(next),
            });
        }
        self.status = next;
        Ok(())
    }
}

fn expected_for(next: BookingStatus) -> &'static str {
    match next {
        BookingStatus::Confirmed => "PENDING",
        BookingStatus::Ongoing => "CONFIRMED",
        BookingStatus::Completed => "ONGOING",
        BookingStatus::Cancelled => "PENDING or CONFIRMED",
        BookingStatus::Pending => "nothing (initial state)",
    }
}

/// Data for a booking about to be reserved
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: String,
    pub contact_email: Option<String>,
    pub vehicle_id: i32,
    pub range: TimeRange,
    pub total_price: Decimal,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, hour, 0, 0).unwrap()
    }

    fn sample_booking(status: BookingStatus) -> Booking {
        Booking {
            id: 1,
            user_id: "u1".into(),
            contact_email: None,
            vehicle_id: 7,
            start_time: at(10),
            end_time: at(14),
            total_price: Decimal::new(20000, 2),
            status,
            created_at: at(0),
        }
    }

    #[test]
    fn range_rejects_end_before_or_at_start() {
        assert!(matches!(
            TimeRange::new(at(10), at(10)),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(
            TimeRange::new(at(11), at(10)),
            Err(DomainError::InvalidRange(_))
        ));
    }

    #[test]
    fn overlapping_ranges_detected() {
        let a = TimeRange::new(at(10), at(14)).unwrap();
        let b = TimeRange::new(at(12), at(16)).unwrap();
        let inner = TimeRange::new(at(11), at(12)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(a.overlaps(&inner));
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let a = TimeRange::new(at(10), at(14)).unwrap();
        let b = TimeRange::new(at(14), at(18)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn active_set_excludes_terminal_states() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::Ongoing.is_active());
        assert!(!BookingStatus::Completed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
    }

    #[test]
    fn pending_confirms_and_cancels() {
        let mut b = sample_booking(BookingStatus::Pending);
        b.transition_to(BookingStatus::Confirmed).unwrap();
        b.transition_to(BookingStatus::Cancelled).unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut b = sample_booking(BookingStatus::Cancelled);
        for next in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Ongoing,
            BookingStatus::Completed,
        ] {
            assert!(b.transition_to(next).is_err());
        }
    }

    #[test]
    fn ongoing_cannot_be_cancelled() {
        let mut b = sample_booking(BookingStatus::Ongoing);
        let err = b.transition_to(BookingStatus::Cancelled).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert!(!BookingStatus::Ongoing.is_cancellable());
    }

    #[test]
    fn status_parse_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Ongoing,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("pending"), None);
    }
}
