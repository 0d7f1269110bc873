use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ride lifecycle status. Rides are created with a driver already bound, so
/// the stored initial state is `driver_en_route`; `requested` exists for
/// client-side drafts and is never a valid transition target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ride_status")]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    #[sea_orm(string_value = "requested")]
    Requested,
    #[sea_orm(string_value = "driver_en_route")]
    DriverEnRoute,
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ride")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ride_id: Uuid,
    pub origin_address: String,
    pub destination_address: String,
    pub origin_latitude: f64,
    pub origin_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    /// Rider-declared trip duration in minutes.
    pub ride_time: i32,
    pub fare_price: f64,
    /// Opaque to the core; recorded and echoed back, never processed.
    pub payment_status: String,
    pub driver_id: i32,
    /// Opaque external principal id issued by the auth provider.
    pub user_id: String,
    pub status: RideStatus,
    pub verification_code: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
