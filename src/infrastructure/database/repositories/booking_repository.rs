//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::payment_repository;
use crate::domain::booking::{Booking, BookingRepository, BookingStatus, NewBooking};
use crate::domain::money::{from_cents, to_cents};
use crate::domain::payment::{Payment, PaymentStatus, PaymentUpdate};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, payment, vehicle};
use crate::infrastructure::database::WriteGate;
use crate::shared::errors::InfraError;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let status = BookingStatus::parse(&m.status)
        .ok_or_else(|| DomainError::Storage(format!("unknown booking status '{}'", m.status)))?;
    Ok(Booking {
        id: m.id,
        user_id: m.user_id,
        contact_email: m.contact_email,
        vehicle_id: m.vehicle_id,
        start_time: m.start_time,
        end_time: m.end_time,
        total_price: from_cents(m.total_price),
        status,
        created_at: m.created_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

fn active_statuses() -> Vec<&'static str> {
    BookingStatus::ACTIVE.iter().map(|s| s.as_str()).collect()
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn reserve(&self, new: NewBooking) -> DomainResult<(Booking, Payment)> {
        let _writer = self.gate.acquire().await;
        let txn = self.db.begin().await.map_err(db_err)?;

        // Row lock on the vehicle (FOR UPDATE; on SQLite the write gate stands in)
        let locked = vehicle::Entity::find_by_id(new.vehicle_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?;
        if !locked.map(|v| v.is_active).unwrap_or(false) {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::not_found("Vehicle", new.vehicle_id));
        }

        let holding = booking::Entity::find()
            .filter(booking::Column::VehicleId.eq(new.vehicle_id))
            .filter(booking::Column::Status.is_in(active_statuses()))
            .all(&txn)
            .await
            .map_err(db_err)?;

        for existing in holding {
            let existing = model_to_domain(existing)?;
            if existing.range()?.overlaps(&new.range) {
                txn.rollback().await.map_err(db_err)?;
                return Err(DomainError::Conflict(format!(
                    "booking {} holds vehicle {} from {} to {}",
                    existing.id, existing.vehicle_id, existing.start_time, existing.end_time
                )));
            }
        }

        let now = Utc::now();
        let cents = to_cents(new.total_price)?;

        let saved_booking = booking::ActiveModel {
            user_id: Set(new.user_id),
            contact_email: Set(new.contact_email),
            vehicle_id: Set(new.vehicle_id),
            start_time: Set(new.range.start()),
            end_time: Set(new.range.end()),
            total_price: Set(cents),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let saved_payment = payment::ActiveModel {
            booking_id: Set(saved_booking.id),
            amount: Set(cents),
            status: Set(PaymentStatus::Pending.as_str().to_string()),
            transaction_id: Set(None),
            session_id: Set(None),
            refund_amount: Set(None),
            refund_id: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(
            "Reserved vehicle {} for booking {} (payment {})",
            saved_booking.vehicle_id, saved_booking.id, saved_payment.id
        );

        Ok((
            model_to_domain(saved_booking)?,
            payment_repository::model_to_domain(saved_payment)?,
        ))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_active_for_vehicle(&self, vehicle_id: i32) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::VehicleId.eq(vehicle_id))
            .filter(booking::Column::Status.is_in(active_statuses()))
            .order_by_asc(booking::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn transition(
        &self,
        booking_id: i32,
        from: BookingStatus,
        to: BookingStatus,
        payment: Option<(i32, &PaymentUpdate)>,
    ) -> DomainResult<bool> {
        debug!("Booking {}: {} -> {}", booking_id, from, to);

        let _writer = self.gate.acquire().await;
        let txn = self.db.begin().await.map_err(db_err)?;
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .filter(booking::Column::Id.eq(booking_id))
            .filter(booking::Column::Status.eq(from.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Ok(false);
        }

        if let Some((payment_id, update)) = payment {
            if !payment_repository::apply_update(&txn, payment_id, update).await? {
                txn.rollback().await.map_err(db_err)?;
                return Ok(false);
            }
        }

        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }
}
