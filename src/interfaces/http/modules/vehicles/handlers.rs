//! Vehicle HTTP handlers

use axum::extract::{Path, State};
use axum::Json;

use super::dto::VehicleDto;
use crate::interfaces::http::common::{ApiError, ApiResponse};
use crate::interfaces::http::modules::RentalState;

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    responses(
        (status = 200, description = "Active vehicles, newest first", body = ApiResponse<Vec<VehicleDto>>)
    )
)]
pub async fn list_vehicles(
    State(state): State<RentalState>,
) -> Result<Json<ApiResponse<Vec<VehicleDto>>>, ApiError> {
    let vehicles = state.ops.queries.list_vehicles().await?;
    Ok(Json(ApiResponse::success(
        vehicles.into_iter().map(VehicleDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle details", body = ApiResponse<VehicleDto>),
        (status = 404, description = "Vehicle missing or inactive")
    )
)]
pub async fn get_vehicle(
    State(state): State<RentalState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<VehicleDto>>, ApiError> {
    let vehicle = state.ops.queries.get_vehicle(id).await?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}
