//! Vehicle domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Kind of rentable vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Scooty,
    Bike,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scooty => "scooty",
            Self::Bike => "bike",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "bike" => Self::Bike,
            _ => Self::Scooty,
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rentable vehicle. Bookings reference it, never own it.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: i32,
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model_name: String,
    pub plate_number: String,
    pub description: String,
    pub price_per_hour: Decimal,
    pub price_per_day: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// "Brand Model", as shown on bookings and checkout line items
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model_name)
    }
}

/// Data for registering a vehicle
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model_name: String,
    pub plate_number: String,
    pub description: String,
    pub price_per_hour: Decimal,
    pub price_per_day: Decimal,
}
