//! Webhook HTTP handler
//!
//! Signature failures are the only rejection. Everything after
//! verification is acknowledged with 200 so the gateway stops retrying;
//! processing errors are logged.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::rental::{Operation, RentalOperations, WebhookDisposition};
use crate::infrastructure::payments::webhook::{WebhookVerifier, SIGNATURE_HEADER};
use crate::interfaces::http::common::ApiResponse;

#[derive(Clone)]
pub struct WebhookState {
    pub ops: Arc<RentalOperations>,
    pub verifier: Arc<WebhookVerifier>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    tag = "Payments",
    request_body(content = String, description = "Raw signed event payload", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac-sha256>")),
    responses(
        (status = 200, description = "Event acknowledged", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Missing or invalid signature")
    )
)]
pub async fn payment_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse<WebhookAck>>) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = match state.verifier.construct_event(&body, signature, Utc::now()) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected webhook delivery");
            metrics::counter!("rental_webhooks_rejected_total").increment(1);
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())));
        }
    };

    let event_type = event.event_type().to_string();
    match state.ops.gateway_events.execute(event).await {
        Ok(WebhookDisposition::Confirmed { booking_id }) => {
            tracing::info!(booking_id, event_type = %event_type, "Webhook confirmed booking");
        }
        Ok(disposition) => {
            tracing::info!(event_type = %event_type, ?disposition, "Webhook processed");
        }
        Err(e) => {
            tracing::error!(event_type = %event_type, error = %e, "Webhook processing failed");
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(WebhookAck { received: true })),
    )
}
