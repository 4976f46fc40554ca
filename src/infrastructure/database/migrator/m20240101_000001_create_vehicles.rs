//! Create vehicles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::VehicleType)
                            .string()
                            .not_null()
                            .default("scooty"),
                    )
                    .col(ColumnDef::new(Vehicles::Brand).string().not_null())
                    .col(ColumnDef::new(Vehicles::ModelName).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::PlateNumber)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Vehicles::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Vehicles::PricePerHour).big_integer().not_null())
                    .col(ColumnDef::new(Vehicles::PricePerDay).big_integer().not_null())
                    .col(
                        ColumnDef::new(Vehicles::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_active")
                    .table(Vehicles::Table)
                    .col(Vehicles::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    VehicleType,
    Brand,
    ModelName,
    PlateNumber,
    Description,
    PricePerHour,
    PricePerDay,
    IsActive,
    CreatedAt,
}
