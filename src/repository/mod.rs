use chrono::Utc;
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::ride::{self, RideStatus};
use crate::entities::driver;
use crate::error::AppResult;

/// Everything the rider supplies when requesting a ride. `ride_id`, `status`
/// and `verification_code` are server-assigned on insert.
#[derive(Debug, Clone)]
pub struct RideDraft {
    pub origin_address: String,
    pub destination_address: String,
    pub origin_latitude: f64,
    pub origin_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub ride_time: i32,
    pub fare_price: f64,
    pub payment_status: String,
    pub driver_id: i32,
    pub user_id: String,
}

/// Persistence boundary for rides. The state machine mutates rides only
/// through this contract, never by touching rows directly. All operations
/// are atomic at the row level.
pub trait RideRepository {
    async fn create(&self, draft: RideDraft) -> AppResult<ride::Model>;

    async fn get_by_id(&self, ride_id: Uuid) -> AppResult<Option<ride::Model>>;

    /// Rides for one rider, newest first, with the assigned driver attached.
    async fn list_by_rider(
        &self,
        rider_id: &str,
    ) -> AppResult<Vec<(ride::Model, Option<driver::Model>)>>;

    /// Conditional status write; `None` when no row matches the ride id.
    async fn update_status(
        &self,
        ride_id: Uuid,
        status: RideStatus,
    ) -> AppResult<Option<(Uuid, RideStatus)>>;

    async fn verification_code(&self, ride_id: Uuid) -> AppResult<Option<String>>;
}

impl<R: RideRepository> RideRepository for &R {
    async fn create(&self, draft: RideDraft) -> AppResult<ride::Model> {
        (**self).create(draft).await
    }

    async fn get_by_id(&self, ride_id: Uuid) -> AppResult<Option<ride::Model>> {
        (**self).get_by_id(ride_id).await
    }

    async fn list_by_rider(
        &self,
        rider_id: &str,
    ) -> AppResult<Vec<(ride::Model, Option<driver::Model>)>> {
        (**self).list_by_rider(rider_id).await
    }

    async fn update_status(
        &self,
        ride_id: Uuid,
        status: RideStatus,
    ) -> AppResult<Option<(Uuid, RideStatus)>> {
        (**self).update_status(ride_id, status).await
    }

    async fn verification_code(&self, ride_id: Uuid) -> AppResult<Option<String>> {
        (**self).verification_code(ride_id).await
    }
}

/// Short numeric pickup code. Uniqueness across rides is not required; the
/// code only proves co-presence for a single ride.
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

pub struct SeaOrmRideRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SeaOrmRideRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

impl RideRepository for SeaOrmRideRepository<'_> {
    async fn create(&self, draft: RideDraft) -> AppResult<ride::Model> {
        let new_ride = ride::ActiveModel {
            ride_id: Set(Uuid::new_v4()),
            origin_address: Set(draft.origin_address),
            destination_address: Set(draft.destination_address),
            origin_latitude: Set(draft.origin_latitude),
            origin_longitude: Set(draft.origin_longitude),
            destination_latitude: Set(draft.destination_latitude),
            destination_longitude: Set(draft.destination_longitude),
            ride_time: Set(draft.ride_time),
            fare_price: Set(draft.fare_price),
            payment_status: Set(draft.payment_status),
            driver_id: Set(draft.driver_id),
            user_id: Set(draft.user_id),
            status: Set(RideStatus::DriverEnRoute),
            verification_code: Set(generate_verification_code()),
            created_at: Set(Utc::now().into()),
        };

        Ok(new_ride.insert(self.db).await?)
    }

    async fn get_by_id(&self, ride_id: Uuid) -> AppResult<Option<ride::Model>> {
        Ok(ride::Entity::find_by_id(ride_id).one(self.db).await?)
    }

    async fn list_by_rider(
        &self,
        rider_id: &str,
    ) -> AppResult<Vec<(ride::Model, Option<driver::Model>)>> {
        Ok(ride::Entity::find()
            .filter(ride::Column::UserId.eq(rider_id))
            .find_also_related(driver::Entity)
            .order_by_desc(ride::Column::CreatedAt)
            .all(self.db)
            .await?)
    }

    async fn update_status(
        &self,
        ride_id: Uuid,
        status: RideStatus,
    ) -> AppResult<Option<(Uuid, RideStatus)>> {
        let Some(existing) = ride::Entity::find_by_id(ride_id).one(self.db).await? else {
            return Ok(None);
        };

        let mut active: ride::ActiveModel = existing.into();
        active.status = Set(status);
        let updated = active.update(self.db).await?;

        Ok(Some((updated.ride_id, updated.status)))
    }

    async fn verification_code(&self, ride_id: Uuid) -> AppResult<Option<String>> {
        Ok(ride::Entity::find_by_id(ride_id)
            .one(self.db)
            .await?
            .map(|r| r.verification_code))
    }
}
