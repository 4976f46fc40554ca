//! Payment entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub booking_id: i32,

    /// Minor units (2 decimal places)
    pub amount: i64,

    /// PENDING, SUCCESS, FAILED, REFUNDED
    pub status: String,

    #[sea_orm(nullable)]
    pub transaction_id: Option<String>,

    #[sea_orm(nullable)]
    pub session_id: Option<String>,

    #[sea_orm(nullable)]
    pub refund_amount: Option<i64>,

    #[sea_orm(nullable)]
    pub refund_id: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
