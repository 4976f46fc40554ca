//! In-memory fixtures for rental operation tests

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use super::{BookingPolicy, CheckoutPolicy, FixedClock, RentalOperations};
use crate::application::ports::{
    BookingNotifier, CheckoutRequest, CheckoutSession, GatewayError, NotificationError,
    PaymentGateway,
};
use crate::domain::{
    Booking, NewVehicle, Principal, RepositoryProvider, Role, Vehicle, VehicleType,
};
use crate::infrastructure::database::{connect_and_migrate, DatabaseConfig, SeaOrmRepositoryProvider};

/// What a notifier was asked to send
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Confirmed(i32),
    Cancelled(i32, Option<Decimal>),
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn booking_confirmed(
        &self,
        booking: &Booking,
        _vehicle: Option<&Vehicle>,
    ) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(Sent::Confirmed(booking.id));
        Ok(())
    }

    async fn booking_cancelled(
        &self,
        booking: &Booking,
        _vehicle: Option<&Vehicle>,
        refunded: Option<Decimal>,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Cancelled(booking.id, refunded));
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl BookingNotifier for FailingNotifier {
    async fn booking_confirmed(
        &self,
        _booking: &Booking,
        _vehicle: Option<&Vehicle>,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp down".into()))
    }

    async fn booking_cancelled(
        &self,
        _booking: &Booking,
        _vehicle: Option<&Vehicle>,
        _refunded: Option<Decimal>,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp down".into()))
    }
}

/// Gateway double returning `cs_test_<booking id>`, or failing on demand
#[derive(Default)]
pub struct StubGateway {
    pub fail: bool,
    pub requests: Mutex<Vec<CheckoutRequest>>,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if self.fail {
            return Err(GatewayError::Rejected {
                status: 401,
                message: "Invalid API Key provided".into(),
            });
        }
        let id = format!("cs_test_{}", request.booking_id);
        self.requests.lock().unwrap().push(request);
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.test/{}", id)),
            id,
        })
    }

    fn publishable_key(&self) -> &str {
        "pk_test_123"
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 1, 12, 0, 0).unwrap()
}

pub fn renter() -> Principal {
    Principal::new("u1", "asha", Role::Renter).with_email("asha@example.com")
}

pub fn other_renter() -> Principal {
    Principal::new("u2", "ravi", Role::Renter).with_email("ravi@example.com")
}

pub fn staff() -> Principal {
    Principal::new("s1", "desk", Role::Staff)
}

pub struct TestEnv {
    pub repos: Arc<dyn RepositoryProvider>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<StubGateway>,
    pub ops: RentalOperations,
    /// Active scooty at 50.00/h
    pub vehicle: Vehicle,
    db_file: Option<PathBuf>,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::build(None, StubGateway::default(), None).await
    }

    pub async fn with_notifier(notifier: Arc<dyn BookingNotifier>) -> Self {
        Self::build(Some(notifier), StubGateway::default(), None).await
    }

    pub async fn with_gateway(gateway: StubGateway) -> Self {
        Self::build(None, gateway, None).await
    }

    /// Same fixtures on a fresh SQLite file behind a multi-connection pool,
    /// as deployed. The file is removed on drop.
    pub async fn file_backed() -> Self {
        let path = std::env::temp_dir().join(format!("rental-test-{}.db", uuid::Uuid::new_v4()));
        Self::build(None, StubGateway::default(), Some(path)).await
    }

    async fn build(
        notifier: Option<Arc<dyn BookingNotifier>>,
        gateway: StubGateway,
        db_file: Option<PathBuf>,
    ) -> Self {
        let config = match &db_file {
            Some(path) => DatabaseConfig::sqlite(&path.to_string_lossy()),
            None => DatabaseConfig::in_memory(),
        };
        let db = connect_and_migrate(&config).await.unwrap();
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));
        let vehicle = repos
            .vehicles()
            .save(NewVehicle {
                vehicle_type: VehicleType::Scooty,
                brand: "Honda".into(),
                model_name: "Activa 6G".into(),
                plate_number: "MH12AB1234".into(),
                description: String::new(),
                price_per_hour: Decimal::new(5000, 2),
                price_per_day: Decimal::new(60000, 2),
            })
            .await
            .unwrap();

        let clock = Arc::new(FixedClock::new(t0()));
        let recording = Arc::new(RecordingNotifier::default());
        let gateway = Arc::new(gateway);
        let ops = RentalOperations::new(
            repos.clone(),
            clock.clone(),
            notifier.unwrap_or_else(|| recording.clone() as Arc<dyn BookingNotifier>),
            gateway.clone(),
            BookingPolicy::default(),
            CheckoutPolicy::default(),
        );

        Self {
            repos,
            clock,
            notifier: recording,
            gateway,
            ops,
            vehicle,
            db_file,
        }
    }

    /// Another active scooty at 50.00/h
    pub async fn add_vehicle(&self, plate_number: &str) -> Vehicle {
        self.repos
            .vehicles()
            .save(NewVehicle {
                vehicle_type: VehicleType::Scooty,
                brand: "TVS".into(),
                model_name: "Jupiter".into(),
                plate_number: plate_number.into(),
                description: String::new(),
                price_per_hour: Decimal::new(5000, 2),
                price_per_day: Decimal::new(60000, 2),
            })
            .await
            .unwrap()
    }

    /// Book the test vehicle from `t0 + start_h` for `hours` hours
    pub async fn book(&self, principal: Principal, start_h: i64, hours: i64) -> Booking {
        use super::{CreateBookingInput, Operation};
        let start = t0() + Duration::hours(start_h);
        self.ops
            .create_booking
            .execute(CreateBookingInput {
                principal,
                vehicle_id: self.vehicle.id,
                start_time: start,
                end_time: start + Duration::hours(hours),
            })
            .await
            .unwrap()
            .booking
    }

    pub async fn confirm(&self, principal: Principal, booking_id: i32) {
        use super::{Operation, SettlePaymentInput, SettlementOutcome};
        self.ops
            .settle_payment
            .execute(SettlePaymentInput {
                principal,
                booking_id,
                outcome: SettlementOutcome::Success,
            })
            .await
            .unwrap();
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        if let Some(path) = &self.db_file {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}
