//! Booking HTTP handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::dto::*;
use crate::application::rental::{
    AdvanceLifecycleInput, CancelBookingInput, CreateBookingInput, LifecycleStep, Operation,
};
use crate::domain::Principal;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::RentalState;

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own bookings (staff: all), newest first", body = ApiResponse<Vec<BookingDto>>),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_bookings(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let bookings = state.ops.queries.list_bookings(&principal).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created, payment pending", body = ApiResponse<CreateBookingResponse>),
        (status = 400, description = "Invalid range or start in the past"),
        (status = 404, description = "Vehicle missing or inactive"),
        (status = 409, description = "Vehicle already booked for an overlapping window"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_booking(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateBookingResponse>>), ApiError> {
    let receipt = state
        .ops
        .create_booking
        .execute(CreateBookingInput {
            principal,
            vehicle_id: request.vehicle_id,
            start_time: request.start_time,
            end_time: request.end_time,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(receipt.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with payment summary", body = ApiResponse<BookingDetailDto>),
        (status = 404, description = "Booking not found or not visible to caller")
    )
)]
pub async fn get_booking(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookingDetailDto>>, ApiError> {
    let details = state.ops.queries.get_booking(&principal, id).await?;
    Ok(Json(ApiResponse::success(details.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<CancelBookingResponse>),
        (status = 400, description = "Already cancelled, already ended or not cancellable"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CancelBookingResponse>>, ApiError> {
    let outcome = state
        .ops
        .cancel_booking
        .execute(CancelBookingInput {
            principal,
            booking_id: id,
        })
        .await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

async fn advance(
    state: RentalState,
    principal: Principal,
    booking_id: i32,
    step: LifecycleStep,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state
        .ops
        .lifecycle
        .execute(AdvanceLifecycleInput {
            principal,
            booking_id,
            step,
        })
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/start",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking is ONGOING", body = ApiResponse<BookingDto>),
        (status = 400, description = "Booking is not CONFIRMED"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn start_booking(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    advance(state, principal, id, LifecycleStep::Start).await
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/complete",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking is COMPLETED", body = ApiResponse<BookingDto>),
        (status = 400, description = "Booking is not ONGOING"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn complete_booking(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    advance(state, principal, id, LifecycleStep::Complete).await
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every booking, newest first", body = ApiResponse<Vec<BookingDto>>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_all_bookings(
    State(state): State<RentalState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let bookings = state.ops.queries.list_all_bookings(&principal).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}
