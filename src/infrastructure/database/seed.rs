//! Demo fleet for fresh installs

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{DomainResult, NewVehicle, RepositoryProvider, VehicleType};

pub fn demo_vehicles() -> Vec<NewVehicle> {
    vec![
        NewVehicle {
            vehicle_type: VehicleType::Scooty,
            brand: "Honda".to_string(),
            model_name: "Activa 6G".to_string(),
            plate_number: "MH12AB1234".to_string(),
            description: "Reliable city scooter, fuel efficient.".to_string(),
            price_per_hour: Decimal::new(15000, 2),
            price_per_day: Decimal::new(160000, 2),
        },
        NewVehicle {
            vehicle_type: VehicleType::Bike,
            brand: "Royal Enfield".to_string(),
            model_name: "Bullet 350".to_string(),
            plate_number: "MH12XY6789".to_string(),
            description: "Classic motorcycle for enthusiasts.".to_string(),
            price_per_hour: Decimal::new(20000, 2),
            price_per_day: Decimal::new(200000, 2),
        },
    ]
}

/// Seed the demo fleet when no vehicle exists yet. Returns how many
/// vehicles were created.
pub async fn seed_demo_vehicles(repos: &dyn RepositoryProvider) -> DomainResult<usize> {
    if repos.vehicles().count().await? > 0 {
        return Ok(0);
    }

    let mut created = 0;
    for vehicle in demo_vehicles() {
        let saved = repos.vehicles().save(vehicle).await?;
        info!(vehicle_id = saved.id, "Seeded vehicle {}", saved.display_name());
        created += 1;
    }
    Ok(created)
}
