use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::entities::ride;
use crate::error::{AppError, AppResult};
use crate::handlers::Data;
use crate::lifecycle::{self, RideStateMachine, StatusChange};
use crate::repository::{RideDraft, RideRepository, SeaOrmRideRepository};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
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

impl CreateRideRequest {
    /// Reject on the first invalid field, naming it.
    fn validate(&self) -> AppResult<()> {
        if self.origin_address.trim().is_empty() {
            return Err(AppError::Validation(
                "origin_address must not be empty".to_string(),
            ));
        }
        if self.destination_address.trim().is_empty() {
            return Err(AppError::Validation(
                "destination_address must not be empty".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.origin_latitude) {
            return Err(AppError::Validation(
                "origin_latitude out of range".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.origin_longitude) {
            return Err(AppError::Validation(
                "origin_longitude out of range".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.destination_latitude) {
            return Err(AppError::Validation(
                "destination_latitude out of range".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.destination_longitude) {
            return Err(AppError::Validation(
                "destination_longitude out of range".to_string(),
            ));
        }
        if self.ride_time <= 0 {
            return Err(AppError::Validation(
                "ride_time must be positive".to_string(),
            ));
        }
        if self.fare_price < 0.0 {
            return Err(AppError::Validation(
                "fare_price must not be negative".to_string(),
            ));
        }
        if self.payment_status.trim().is_empty() {
            return Err(AppError::Validation(
                "payment_status must not be empty".to_string(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(AppError::Validation(
                "user_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn into_draft(self) -> RideDraft {
        RideDraft {
            origin_address: self.origin_address,
            destination_address: self.destination_address,
            origin_latitude: self.origin_latitude,
            origin_longitude: self.origin_longitude,
            destination_latitude: self.destination_latitude,
            destination_longitude: self.destination_longitude,
            ride_time: self.ride_time,
            fare_price: self.fare_price,
            payment_status: self.payment_status,
            driver_id: self.driver_id,
            user_id: self.user_id,
        }
    }
}

/// Create a ride with a driver already bound. Status and verification code
/// are server-assigned.
pub async fn create_ride(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateRideRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Data<ride::Model>>)> {
    payload.validate()?;

    let repo = SeaOrmRideRepository::new(&state.db);
    let ride = repo.create(payload.into_draft()).await?;

    Ok((StatusCode::CREATED, Json(Data { data: ride })))
}

#[derive(Debug, Serialize)]
pub struct DriverInfo {
    pub driver_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: String,
    pub car_image_url: String,
    pub car_seats: i32,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct RideWithDriver {
    #[serde(flatten)]
    pub ride: ride::Model,
    pub driver: Option<DriverInfo>,
}

/// Ride history for one rider, newest first, with the assigned driver
/// embedded.
pub async fn rider_history(
    State(state): State<AppState>,
    Path(rider_id): Path<String>,
) -> AppResult<Json<Data<Vec<RideWithDriver>>>> {
    if rider_id.trim().is_empty() {
        return Err(AppError::Validation("rider id must not be empty".to_string()));
    }

    let repo = SeaOrmRideRepository::new(&state.db);
    let rides = repo.list_by_rider(&rider_id).await?;

    let responses: Vec<RideWithDriver> = rides
        .into_iter()
        .map(|(ride, driver)| RideWithDriver {
            ride,
            driver: driver.map(|d| DriverInfo {
                driver_id: d.id,
                first_name: d.first_name,
                last_name: d.last_name,
                profile_image_url: d.profile_image_url,
                car_image_url: d.car_image_url,
                car_seats: d.car_seats,
                rating: d.rating,
            }),
        })
        .collect();

    Ok(Json(Data { data: responses }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub ride_id: Uuid,
    pub status: String,
}

/// Apply a lifecycle transition. The target status is validated before any
/// storage access.
pub async fn update_status(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateStatusRequest>, AppError>,
) -> AppResult<Json<Data<StatusChange>>> {
    let status = lifecycle::parse_status(&payload.status).ok_or_else(|| {
        AppError::Validation(
            "status must be one of driver_en_route, arrived, in_progress, completed".to_string(),
        )
    })?;

    let machine = RideStateMachine::new(SeaOrmRideRepository::new(&state.db));
    let change = machine.apply_status(payload.ride_id, status).await?;

    Ok(Json(Data { data: change }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub ride_id: Uuid,
    /// Clients send the code either as a string or a bare number; it is
    /// always compared as a string.
    #[serde(deserialize_with = "deserialize_code")]
    pub code: String,
}

fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(u64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(text) => text,
        Code::Number(number) => number.to_string(),
    })
}

/// Verify the pickup code and move the ride to in_progress.
pub async fn verify_pickup(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<VerifyRequest>, AppError>,
) -> AppResult<Json<Data<StatusChange>>> {
    if payload.code.trim().is_empty() {
        return Err(AppError::Validation("code must not be empty".to_string()));
    }

    let machine = RideStateMachine::new(SeaOrmRideRepository::new(&state.db));
    let change = machine.verify_pickup(payload.ride_id, &payload.code).await?;

    Ok(Json(Data { data: change }))
}
