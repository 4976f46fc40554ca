//! Payment HTTP handlers

use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::dto::*;
use crate::application::rental::{
    CreateCheckoutSessionInput, Operation, SettlePaymentInput, SettlementOutcome,
};
use crate::domain::Principal;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::RentalState;

#[utoipa::path(
    post,
    path = "/api/v1/payments/mock/{booking_id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("booking_id" = i32, Path, description = "Booking ID")),
    request_body = MockPaymentRequest,
    responses(
        (status = 200, description = "Payment settled", body = ApiResponse<MockPaymentResponse>),
        (status = 400, description = "Booking is not PENDING"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn mock_payment(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    Path(booking_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<MockPaymentRequest>,
) -> Result<Json<ApiResponse<MockPaymentResponse>>, ApiError> {
    let result = state
        .ops
        .settle_payment
        .execute(SettlePaymentInput {
            principal,
            booking_id,
            outcome: SettlementOutcome::from_simulate(&request.simulate),
        })
        .await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/checkout/{booking_id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Checkout session created", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Booking is not PENDING"),
        (status = 404, description = "Booking not found"),
        (status = 502, description = "Payment gateway failure")
    )
)]
pub async fn create_checkout(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    Path(booking_id): Path<i32>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, ApiError> {
    let started = state
        .ops
        .checkout
        .execute(CreateCheckoutSessionInput {
            principal,
            booking_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(started.into())))
}
