//! SeaORM implementation of VehicleRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::money::{from_cents, to_cents};
use crate::domain::vehicle::{NewVehicle, Vehicle, VehicleRepository, VehicleType};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::vehicle;
use crate::infrastructure::database::WriteGate;
use crate::shared::errors::InfraError;

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: vehicle::Model) -> Vehicle {
    Vehicle {
        id: m.id,
        vehicle_type: VehicleType::from_str(&m.vehicle_type),
        brand: m.brand,
        model_name: m.model_name,
        plate_number: m.plate_number,
        description: m.description,
        price_per_hour: from_cents(m.price_per_hour),
        price_per_day: from_cents(m.price_per_day),
        is_active: m.is_active,
        created_at: m.created_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

// ── VehicleRepository impl ──────────────────────────────────────

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn find_active(&self) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .filter(vehicle::Column::IsActive.eq(true))
            .order_by_desc(vehicle::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>> {
        let model = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn save(&self, v: NewVehicle) -> DomainResult<Vehicle> {
        debug!("Saving vehicle: {} {}", v.brand, v.model_name);

        let model = vehicle::ActiveModel {
            vehicle_type: Set(v.vehicle_type.as_str().to_string()),
            brand: Set(v.brand),
            model_name: Set(v.model_name),
            plate_number: Set(v.plate_number),
            description: Set(v.description),
            price_per_hour: Set(to_cents(v.price_per_hour)?),
            price_per_day: Set(to_cents(v.price_per_day)?),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let _writer = self.gate.acquire().await;
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(saved))
    }

    async fn set_active(&self, id: i32, active: bool) -> DomainResult<bool> {
        let _writer = self.gate.acquire().await;
        let Some(existing) = vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(false);
        };

        debug!("Setting vehicle {} active={}", id, active);
        let mut model: vehicle::ActiveModel = existing.into();
        model.is_active = Set(active);
        model.update(&self.db).await.map_err(db_err)?;
        Ok(true)
    }

    async fn count(&self) -> DomainResult<u64> {
        vehicle::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
