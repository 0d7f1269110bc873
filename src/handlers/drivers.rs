use axum::extract::{Query, State};
use axum::Json;
use sea_orm::EntityTrait;
use serde::Deserialize;

use crate::entities::driver;
use crate::error::AppResult;
use crate::handlers::Data;
use crate::ranking::{self, RankedDriver};
use crate::utils::geo::Coordinate;
use crate::AppState;

/// Current driver roster, unranked.
pub async fn list_drivers(
    State(state): State<AppState>,
) -> AppResult<Json<Data<Vec<driver::Model>>>> {
    let drivers = driver::Entity::find().all(&state.db).await?;
    Ok(Json(Data { data: drivers }))
}

#[derive(Debug, Deserialize)]
pub struct RankQuery {
    pub user_latitude: Option<f64>,
    pub user_longitude: Option<f64>,
    pub destination_latitude: Option<f64>,
    pub destination_longitude: Option<f64>,
}

/// Driver roster ranked for one rider. With a destination the ranking is by
/// ETA through the directions collaborator; without one it is by raw
/// distance. Without rider coordinates there is nothing to rank and the
/// result is empty.
pub async fn ranked_drivers(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> AppResult<Json<Data<Vec<RankedDriver>>>> {
    let drivers = driver::Entity::find().all(&state.db).await?;

    let rider = match (query.user_latitude, query.user_longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinate {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let ranked = match (query.destination_latitude, query.destination_longitude) {
        (Some(latitude), Some(longitude)) => {
            ranking::rank_by_eta(
                &state.directions,
                rider,
                Coordinate {
                    latitude,
                    longitude,
                },
                state.config.average_speed_kmh,
                &drivers,
            )
            .await
        }
        _ => ranking::rank_by_distance(rider, &drivers),
    };

    Ok(Json(Data { data: ranked }))
}
