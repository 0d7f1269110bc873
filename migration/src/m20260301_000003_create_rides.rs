use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000002_create_drivers::Driver;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create ride status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(RideStatus::Enum)
                    .values([
                        RideStatus::Requested,
                        RideStatus::DriverEnRoute,
                        RideStatus::Arrived,
                        RideStatus::InProgress,
                        RideStatus::Completed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ride::Table)
                    .if_not_exists()
                    .col(uuid(Ride::RideId).primary_key())
                    .col(string(Ride::OriginAddress).not_null())
                    .col(string(Ride::DestinationAddress).not_null())
                    .col(double(Ride::OriginLatitude).not_null())
                    .col(double(Ride::OriginLongitude).not_null())
                    .col(double(Ride::DestinationLatitude).not_null())
                    .col(double(Ride::DestinationLongitude).not_null())
                    .col(integer(Ride::RideTime).not_null())
                    .col(double(Ride::FarePrice).not_null())
                    .col(string_len(Ride::PaymentStatus, 32).not_null())
                    .col(integer(Ride::DriverId).not_null())
                    .col(string_len(Ride::UserId, 255).not_null())
                    .col(
                        ColumnDef::new(Ride::Status)
                            .custom(RideStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len(Ride::VerificationCode, 8).not_null())
                    .col(
                        timestamp_with_time_zone(Ride::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_driver")
                            .from(Ride::Table, Ride::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Ride history is always read per rider, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_ride_user_id")
                    .table(Ride::Table)
                    .col(Ride::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ride::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(RideStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ride {
    Table,
    RideId,
    OriginAddress,
    DestinationAddress,
    OriginLatitude,
    OriginLongitude,
    DestinationLatitude,
    DestinationLongitude,
    RideTime,
    FarePrice,
    PaymentStatus,
    DriverId,
    UserId,
    Status,
    VerificationCode,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum RideStatus {
    #[sea_orm(iden = "ride_status")]
    Enum,
    #[sea_orm(iden = "requested")]
    Requested,
    #[sea_orm(iden = "driver_en_route")]
    DriverEnRoute,
    #[sea_orm(iden = "arrived")]
    Arrived,
    #[sea_orm(iden = "in_progress")]
    InProgress,
    #[sea_orm(iden = "completed")]
    Completed,
}
