//! Vehicle DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Vehicle;

/// Rentable vehicle
#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleDto {
    pub id: i32,
    /// `scooty` or `bike`
    pub vehicle_type: String,
    pub brand: String,
    pub model_name: String,
    /// "Brand Model"
    pub display_name: String,
    pub plate_number: String,
    pub description: String,
    #[schema(value_type = String, example = "50.00")]
    pub price_per_hour: Decimal,
    #[schema(value_type = String, example = "600.00")]
    pub price_per_day: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleDto {
    fn from(v: Vehicle) -> Self {
        Self {
            display_name: v.display_name(),
            id: v.id,
            vehicle_type: v.vehicle_type.as_str().to_string(),
            brand: v.brand,
            model_name: v.model_name,
            plate_number: v.plate_number,
            description: v.description,
            price_per_hour: v.price_per_hour,
            price_per_day: v.price_per_day,
            created_at: v.created_at,
        }
    }
}
