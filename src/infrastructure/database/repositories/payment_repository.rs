//! SeaORM implementation of PaymentRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::money::{from_cents, to_cents};
use crate::domain::payment::{Payment, PaymentRepository, PaymentStatus, PaymentUpdate};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment;
use crate::infrastructure::database::WriteGate;
use crate::shared::errors::InfraError;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        Self { db, gate }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: payment::Model) -> DomainResult<Payment> {
    let status = PaymentStatus::parse(&m.status)
        .ok_or_else(|| DomainError::Storage(format!("unknown payment status '{}'", m.status)))?;
    Ok(Payment {
        id: m.id,
        booking_id: m.booking_id,
        amount: from_cents(m.amount),
        status,
        transaction_id: m.transaction_id,
        session_id: m.session_id,
        refund_amount: m.refund_amount.map(from_cents),
        refund_id: m.refund_id,
        created_at: m.created_at,
    })
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

/// Compare-and-set `update` onto payment `payment_id` through `conn`
/// (pool or transaction). Only the columns the update owns are written.
pub(crate) async fn apply_update<C: ConnectionTrait>(
    conn: &C,
    payment_id: i32,
    update: &PaymentUpdate,
) -> DomainResult<bool> {
    debug!("Payment {}: -> {}", payment_id, update.target());

    let expected: Vec<&str> = update.expected_from().iter().map(|s| s.as_str()).collect();
    let mut query = payment::Entity::update_many()
        .col_expr(payment::Column::Status, Expr::value(update.target().as_str()))
        .filter(payment::Column::Id.eq(payment_id))
        .filter(payment::Column::Status.is_in(expected));

    match update {
        PaymentUpdate::Succeeded {
            transaction_id: Some(txn),
            ..
        } => {
            query = query.col_expr(payment::Column::TransactionId, Expr::value(txn.clone()));
        }
        PaymentUpdate::Refunded {
            breakdown,
            refund_id,
        } => {
            query = query
                .col_expr(
                    payment::Column::RefundAmount,
                    Expr::value(to_cents(breakdown.refunded)?),
                )
                .col_expr(payment::Column::RefundId, Expr::value(refund_id.clone()));
        }
        _ => {}
    }

    let result = query.exec(conn).await.map_err(db_err)?;
    if result.rows_affected == 0 {
        return Ok(false);
    }

    if let PaymentUpdate::Succeeded {
        session_id: Some(session),
        ..
    } = update
    {
        payment::Entity::update_many()
            .col_expr(payment::Column::SessionId, Expr::value(session.clone()))
            .filter(payment::Column::Id.eq(payment_id))
            .filter(payment::Column::SessionId.is_null())
            .exec(conn)
            .await
            .map_err(db_err)?;
    }
    Ok(true)
}

// ── PaymentRepository impl ──────────────────────────────────────

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Payment>> {
        payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_booking(&self, booking_id: i32) -> DomainResult<Option<Payment>> {
        payment::Entity::find()
            .filter(payment::Column::BookingId.eq(booking_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_session(&self, session_id: &str) -> DomainResult<Option<Payment>> {
        payment::Entity::find()
            .filter(payment::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn attach_session(&self, payment_id: i32, session_id: &str) -> DomainResult<()> {
        debug!("Attaching session {} to payment {}", session_id, payment_id);
        let _writer = self.gate.acquire().await;
        let result = payment::Entity::update_many()
            .col_expr(payment::Column::SessionId, Expr::value(session_id))
            .filter(payment::Column::Id.eq(payment_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Payment", payment_id));
        }
        Ok(())
    }

    async fn apply(&self, payment_id: i32, update: &PaymentUpdate) -> DomainResult<bool> {
        let _writer = self.gate.acquire().await;
        apply_update(&self.db, payment_id, update).await
    }
}
