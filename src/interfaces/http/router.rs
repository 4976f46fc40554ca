//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::rental::RentalOperations;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::payments::webhook::WebhookVerifier;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    bookings, health, payments, vehicles, webhooks, RentalState,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        vehicles::list_vehicles,
        vehicles::get_vehicle,
        bookings::list_bookings,
        bookings::create_booking,
        bookings::get_booking,
        bookings::cancel_booking,
        bookings::start_booking,
        bookings::complete_booking,
        bookings::list_all_bookings,
        payments::mock_payment,
        payments::create_checkout,
        webhooks::payment_webhook,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            vehicles::VehicleDto,
            bookings::CreateBookingRequest,
            bookings::BookingDto,
            bookings::PaymentDto,
            bookings::CreateBookingResponse,
            bookings::BookingDetailDto,
            bookings::CancelBookingResponse,
            payments::MockPaymentRequest,
            payments::MockPaymentResponse,
            payments::CheckoutResponse,
            webhooks::WebhookAck,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Vehicles", description = "Rentable vehicle catalogue"),
        (name = "Bookings", description = "Vehicle bookings: create, view, cancel, lifecycle"),
        (name = "Payments", description = "Booking payments: direct settle, hosted checkout, gateway webhook"),
        (name = "Admin", description = "Staff-only views"),
    ),
    info(
        title = "ScootyGo Rental API",
        version = "0.1.0",
        description = "Scooter and bike rental bookings with payments and refunds",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    ops: Arc<RentalOperations>,
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    webhook_verifier: Arc<WebhookVerifier>,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let auth_state = AuthState { jwt_config };
    let rental_state = RentalState { ops: ops.clone() };

    let public_routes = Router::new()
        .route("/api/v1/vehicles", get(vehicles::list_vehicles))
        .route("/api/v1/vehicles/{id}", get(vehicles::get_vehicle))
        .with_state(rental_state.clone());

    let protected_routes = Router::new()
        .route(
            "/api/v1/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/api/v1/bookings/{id}", get(bookings::get_booking))
        .route("/api/v1/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route("/api/v1/bookings/{id}/start", post(bookings::start_booking))
        .route(
            "/api/v1/bookings/{id}/complete",
            post(bookings::complete_booking),
        )
        .route("/api/v1/admin/bookings", get(bookings::list_all_bookings))
        .route(
            "/api/v1/payments/mock/{booking_id}",
            post(payments::mock_payment),
        )
        .route(
            "/api/v1/payments/checkout/{booking_id}",
            post(payments::create_checkout),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(rental_state);

    // Authenticated by signature, not by bearer token
    let webhook_routes = Router::new()
        .route("/api/v1/payments/webhook", post(webhooks::payment_webhook))
        .with_state(webhooks::WebhookState {
            ops,
            verifier: webhook_verifier,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .merge(webhook_routes);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use chrono::{Duration, DurationRound, Utc};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::rental::test_support::{
        other_renter, renter, staff, RecordingNotifier, StubGateway,
    };
    use crate::application::rental::{BookingPolicy, CheckoutPolicy, SystemClock};
    use crate::domain::{NewVehicle, Principal, RepositoryProvider, VehicleType};
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::database::{connect_and_migrate, DatabaseConfig};
    use crate::infrastructure::payments::webhook::SIGNATURE_HEADER;
    use crate::infrastructure::SeaOrmRepositoryProvider;

    const WEBHOOK_SECRET: &str = "whsec_test";

    struct Harness {
        app: Router,
        jwt: JwtConfig,
        verifier: Arc<WebhookVerifier>,
        notifier: Arc<RecordingNotifier>,
        vehicle_id: i32,
    }

    impl Harness {
        async fn new() -> Self {
            Self::with_webhook_secret(WEBHOOK_SECRET).await
        }

        async fn with_webhook_secret(webhook_secret: &str) -> Self {
            let db = connect_and_migrate(&DatabaseConfig::in_memory()).await.unwrap();
            let repos: Arc<dyn RepositoryProvider> =
                Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
            let vehicle = repos
                .vehicles()
                .save(NewVehicle {
                    vehicle_type: VehicleType::Bike,
                    brand: "Royal Enfield".into(),
                    model_name: "Bullet 350".into(),
                    plate_number: "KA01XY9876".into(),
                    description: String::new(),
                    price_per_hour: Decimal::new(5000, 2),
                    price_per_day: Decimal::new(60000, 2),
                })
                .await
                .unwrap();

            let notifier = Arc::new(RecordingNotifier::default());
            let ops = Arc::new(RentalOperations::new(
                repos,
                Arc::new(SystemClock),
                notifier.clone(),
                Arc::new(StubGateway::default()),
                BookingPolicy::default(),
                CheckoutPolicy::default(),
            ));
            let jwt = JwtConfig::new("router-secret", "scootygo");
            let verifier = Arc::new(WebhookVerifier::new(webhook_secret, 300));
            let app = create_api_router(ops, db, jwt.clone(), verifier.clone(), None);

            Self {
                app,
                jwt,
                verifier,
                notifier,
                vehicle_id: vehicle.id,
            }
        }

        fn bearer(&self, principal: &Principal) -> String {
            format!("Bearer {}", create_token(principal, &self.jwt).unwrap())
        }

        async fn send(&self, req: Request<Body>) -> Response {
            self.app.clone().oneshot(req).await.unwrap()
        }

        async fn call(
            &self,
            method: &str,
            uri: &str,
            principal: Option<&Principal>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(p) = principal {
                builder = builder.header("authorization", self.bearer(p));
            }
            let req = match body {
                Some(b) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(b.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let resp = self.send(req).await;
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, json)
        }

        /// Book `hours` hours starting `start_in` from now
        async fn book(&self, principal: &Principal, start_in: Duration, hours: i64) -> (StatusCode, Value) {
            let start = Utc::now().duration_trunc(Duration::hours(1)).unwrap() + start_in;
            self.call(
                "POST",
                "/api/v1/bookings",
                Some(principal),
                Some(json!({
                    "vehicle_id": self.vehicle_id,
                    "start_time": start.to_rfc3339(),
                    "end_time": (start + Duration::hours(hours)).to_rfc3339(),
                })),
            )
            .await
        }
    }

    fn booking_id(body: &Value) -> i64 {
        body["data"]["booking"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn vehicles_are_public() {
        let h = Harness::new().await;
        let (status, body) = h.call("GET", "/api/v1/vehicles", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["display_name"], "Royal Enfield Bullet 350");

        let (status, _) = h.call("GET", "/api/v1/vehicles/999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bookings_require_a_token() {
        let h = Harness::new().await;
        let (status, body) = h.call("GET", "/api/v1/bookings", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn create_conflict_and_cancel_flow() {
        let h = Harness::new().await;
        let r = renter();

        let (status, body) = h.book(&r, Duration::days(3), 4).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["booking"]["status"], "PENDING");
        assert_eq!(body["data"]["booking"]["total_price"], "200.00");
        assert_eq!(body["data"]["payment"]["status"], "PENDING");
        let id = booking_id(&body);

        let (status, _) = h.book(&other_renter(), Duration::days(3) + Duration::hours(2), 4).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = h
            .call("POST", &format!("/api/v1/payments/mock/{}", id), Some(&r), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["booking"]["status"], "CONFIRMED");
        assert_eq!(body["data"]["payment"]["status"], "SUCCESS");

        let (status, body) = h
            .call("POST", &format!("/api/v1/bookings/{}/cancel", id), Some(&r), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CANCELLED");
        assert_eq!(body["data"]["late_cancellation"], false);
        assert_eq!(body["data"]["refund_amount"], "200.00");

        let (status, _) = h
            .call("POST", &format!("/api/v1/bookings/{}/cancel", id), Some(&r), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_range_and_validation_errors() {
        let h = Harness::new().await;
        let (status, _) = h.book(&renter(), Duration::days(1), 0).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = h.book(&renter(), -Duration::days(1), 2).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = h
            .call(
                "POST",
                "/api/v1/bookings",
                Some(&renter()),
                Some(json!({
                    "vehicle_id": 0,
                    "start_time": "2031-01-01T10:00:00Z",
                    "end_time": "2031-01-01T12:00:00Z",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn cancel_by_other_renter_is_forbidden() {
        let h = Harness::new().await;
        let (_, body) = h.book(&renter(), Duration::days(2), 2).await;
        let id = booking_id(&body);

        let (status, _) = h
            .call("POST", &format!("/api/v1/bookings/{}/cancel", id), Some(&other_renter()), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn detail_and_listing_respect_ownership() {
        let h = Harness::new().await;
        let (_, body) = h.book(&renter(), Duration::days(2), 2).await;
        let id = booking_id(&body);

        let (status, body) = h
            .call("GET", &format!("/api/v1/bookings/{}", id), Some(&renter()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["vehicle_display"], "Royal Enfield Bullet 350");
        assert_eq!(body["data"]["payment"]["status"], "PENDING");

        let (status, _) = h
            .call("GET", &format!("/api/v1/bookings/{}", id), Some(&other_renter()), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = h.call("GET", "/api/v1/bookings", Some(&other_renter()), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);

        let (status, _) = h.call("GET", "/api/v1/admin/bookings", Some(&renter()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = h.call("GET", "/api/v1/admin/bookings", Some(&staff()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn checkout_returns_session_and_key() {
        let h = Harness::new().await;
        let (_, body) = h.book(&renter(), Duration::days(2), 2).await;
        let id = booking_id(&body);

        let (status, body) = h
            .call("POST", &format!("/api/v1/payments/checkout/{}", id), Some(&renter()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["session_id"], format!("cs_test_{}", id));
        assert_eq!(body["data"]["publishable_key"], "pk_test_123");
        assert_eq!(body["data"]["amount"], 10000);
        assert_eq!(body["data"]["currency"], "inr");
    }

    fn completed_event(payment_id: i64, booking_id: i64) -> String {
        json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_router",
                    "payment_intent": "pi_router",
                    "metadata": {
                        "booking_id": booking_id.to_string(),
                        "payment_id": payment_id.to_string(),
                    }
                }
            }
        })
        .to_string()
    }

    async fn post_webhook(h: &Harness, payload: &str, signature: Option<String>) -> StatusCode {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/payments/webhook")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header(SIGNATURE_HEADER, sig);
        }
        let req = builder.body(Body::from(payload.to_string())).unwrap();
        h.send(req).await.status()
    }

    #[tokio::test]
    async fn signed_webhook_confirms_booking_once() {
        let h = Harness::new().await;
        let (_, body) = h.book(&renter(), Duration::days(2), 2).await;
        let id = booking_id(&body);
        let payment_id = body["data"]["payment"]["id"].as_i64().unwrap();

        let payload = completed_event(payment_id, id);
        let sig = h.verifier.sign(payload.as_bytes(), Utc::now().timestamp()).unwrap();

        assert_eq!(post_webhook(&h, &payload, Some(sig.clone())).await, StatusCode::OK);
        assert_eq!(post_webhook(&h, &payload, Some(sig)).await, StatusCode::OK);
        assert_eq!(h.notifier.sent().len(), 1);

        let (_, body) = h
            .call("GET", &format!("/api/v1/bookings/{}", id), Some(&renter()), None)
            .await;
        assert_eq!(body["data"]["booking"]["status"], "CONFIRMED");
        assert_eq!(body["data"]["payment"]["transaction_id"], "pi_router");
    }

    #[tokio::test]
    async fn forged_or_unsigned_webhook_is_rejected() {
        let h = Harness::new().await;
        let payload = completed_event(1, 1);

        assert_eq!(post_webhook(&h, &payload, None).await, StatusCode::BAD_REQUEST);

        let forged = WebhookVerifier::new("wrong", 300)
            .sign(payload.as_bytes(), Utc::now().timestamp())
            .unwrap();
        assert_eq!(post_webhook(&h, &payload, Some(forged)).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unconfigured_webhook_secret_rejects_empty_key_signatures() {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let h = Harness::with_webhook_secret("").await;
        let (_, body) = h.book(&renter(), Duration::days(2), 2).await;
        let id = booking_id(&body);
        let payment_id = body["data"]["payment"]["id"].as_i64().unwrap();
        let payload = completed_event(payment_id, id);

        let ts = Utc::now().timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(b"").unwrap();
        mac.update(format!("{}.{}", ts, payload).as_bytes());
        let forged = format!("t={},v1={}", ts, hex::encode(mac.finalize().into_bytes()));

        assert_eq!(post_webhook(&h, &payload, Some(forged)).await, StatusCode::BAD_REQUEST);
        let (_, body) = h
            .call("GET", &format!("/api/v1/bookings/{}", id), Some(&renter()), None)
            .await;
        assert_eq!(body["data"]["booking"]["status"], "PENDING");
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn webhook_for_unknown_payment_is_acknowledged() {
        let h = Harness::new().await;
        let payload = completed_event(404, 404);
        let sig = h.verifier.sign(payload.as_bytes(), Utc::now().timestamp()).unwrap();
        assert_eq!(post_webhook(&h, &payload, Some(sig)).await, StatusCode::OK);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn lifecycle_is_staff_only() {
        let h = Harness::new().await;
        let (_, body) = h.book(&renter(), Duration::days(2), 2).await;
        let id = booking_id(&body);
        h.call("POST", &format!("/api/v1/payments/mock/{}", id), Some(&renter()), Some(json!({"simulate": "success"})))
            .await;

        let (status, _) = h
            .call("POST", &format!("/api/v1/bookings/{}/start", id), Some(&renter()), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = h
            .call("POST", &format!("/api/v1/bookings/{}/start", id), Some(&staff()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ONGOING");

        let (status, body) = h
            .call("POST", &format!("/api/v1/bookings/{}/complete", id), Some(&staff()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "COMPLETED");
    }

    #[tokio::test]
    async fn health_and_request_id() {
        let h = Harness::new().await;
        let req = Request::builder()
            .uri("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let resp = h.send(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["x-request-id"], "abc-123");
    }

    #[test]
    fn openapi_lists_rental_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/bookings"));
        assert!(doc.paths.paths.contains_key("/api/v1/payments/webhook"));
    }
}
