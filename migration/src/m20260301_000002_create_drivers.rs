use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Driver::Table)
                    .if_not_exists()
                    .col(pk_auto(Driver::Id))
                    .col(string_len(Driver::FirstName, 100).not_null())
                    .col(string_len(Driver::LastName, 100).not_null())
                    .col(string(Driver::ProfileImageUrl).not_null())
                    .col(string(Driver::CarImageUrl).not_null())
                    .col(integer(Driver::CarSeats).not_null())
                    .col(double(Driver::Rating).not_null())
                    .col(double(Driver::Latitude).not_null())
                    .col(double(Driver::Longitude).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Driver::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Driver {
    Table,
    Id,
    FirstName,
    LastName,
    ProfileImageUrl,
    CarImageUrl,
    CarSeats,
    Rating,
    Latitude,
    Longitude,
}
