use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::utils::geo::Coordinate;

/// Live travel-time lookup. Consumed as "given two coordinates, return an
/// ETA"; the provider behind it is not part of the core.
pub trait Directions {
    async fn travel_minutes(&self, from: Coordinate, to: Coordinate) -> AppResult<f64>;
}

/// Directions provider over HTTP (Google Directions wire shape). The request
/// timeout is enforced at the client level so a slow provider degrades a
/// single ranking entry instead of hanging the batch.
#[derive(Clone)]
pub struct HttpDirections {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpDirections {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.directions_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Collaborator(format!("Failed to build directions client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.directions_base_url.clone(),
            api_key: config.directions_api_key.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    duration: LegDuration,
}

#[derive(Debug, Deserialize)]
struct LegDuration {
    /// Seconds.
    value: f64,
}

impl Directions for HttpDirections {
    async fn travel_minutes(&self, from: Coordinate, to: Coordinate) -> AppResult<f64> {
        let url = format!("{}/maps/api/directions/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("origin", format!("{},{}", from.latitude, from.longitude)),
                ("destination", format!("{},{}", to.latitude, to.longitude)),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Collaborator(format!("Directions request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Collaborator(format!(
                "Directions provider returned {}",
                response.status()
            )));
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Collaborator(format!("Malformed directions response: {}", e)))?;

        let seconds = body
            .routes
            .first()
            .and_then(|r| r.legs.first())
            .map(|l| l.duration.value)
            .ok_or_else(|| {
                AppError::Collaborator("Directions response contained no route".to_string())
            })?;

        Ok(seconds / 60.0)
    }
}
