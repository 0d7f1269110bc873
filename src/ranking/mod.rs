use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::directions::Directions;
use crate::entities::driver;
use crate::utils::geo::{self, Coordinate};

/// A candidate driver annotated with proximity to the rider. Derived fresh
/// per ranking call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDriver {
    #[serde(flatten)]
    pub driver: driver::Model,
    pub distance_from_rider_km: f64,
    /// Pickup leg plus rider-to-destination leg. Absent until a destination
    /// is chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<f64>,
}

/// Rank candidates by raw distance from the rider. Used to populate the map
/// before a destination is chosen. Without a rider coordinate there is
/// nothing to rank against and the result is empty.
pub fn rank_by_distance(
    rider: Option<Coordinate>,
    drivers: &[driver::Model],
) -> Vec<RankedDriver> {
    let Some(rider) = rider else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedDriver> = drivers
        .iter()
        .map(|d| RankedDriver {
            driver: d.clone(),
            distance_from_rider_km: geo::distance_km(rider, d.coordinate()),
            eta_minutes: None,
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_from_rider_km.total_cmp(&b.distance_from_rider_km));
    ranked
}

/// Rank candidates by time to complete the trip: driver-to-rider pickup leg
/// plus the rider-to-destination leg. A failed directions lookup degrades
/// that entry to the linear estimate instead of aborting the batch. Ties
/// break on distance from the rider.
pub async fn rank_by_eta<D: Directions>(
    directions: &D,
    rider: Option<Coordinate>,
    destination: Coordinate,
    average_speed_kmh: f64,
    drivers: &[driver::Model],
) -> Vec<RankedDriver> {
    let Some(rider) = rider else {
        return Vec::new();
    };

    // The rider-to-destination leg is identical for every candidate.
    let trip_minutes = match directions.travel_minutes(rider, destination).await {
        Ok(minutes) => minutes,
        Err(err) => {
            tracing::warn!(error = %err, "Directions lookup for trip leg failed, using linear estimate");
            geo::estimated_minutes(geo::distance_km(rider, destination), average_speed_kmh)
        }
    };

    let mut ranked = Vec::with_capacity(drivers.len());
    for d in drivers {
        let distance = geo::distance_km(rider, d.coordinate());
        let pickup_minutes = match directions.travel_minutes(d.coordinate(), rider).await {
            Ok(minutes) => minutes,
            Err(err) => {
                tracing::warn!(
                    driver_id = d.id,
                    error = %err,
                    "Directions lookup for pickup leg failed, using linear estimate"
                );
                geo::estimated_minutes(distance, average_speed_kmh)
            }
        };

        ranked.push(RankedDriver {
            driver: d.clone(),
            distance_from_rider_km: distance,
            eta_minutes: Some(pickup_minutes + trip_minutes),
        });
    }

    ranked.sort_by(|a, b| {
        let eta_a = a.eta_minutes.unwrap_or(f64::INFINITY);
        let eta_b = b.eta_minutes.unwrap_or(f64::INFINITY);
        eta_a
            .total_cmp(&eta_b)
            .then(a.distance_from_rider_km.total_cmp(&b.distance_from_rider_km))
    });
    ranked
}

/// Monotonic tickets for ranking requests. Location updates can race the
/// ranking computation, so callers tag each request and drop any completion
/// that is no longer the newest one issued.
#[derive(Debug, Default)]
pub struct RankingSequencer {
    issued: AtomicU64,
}

impl RankingSequencer {
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
        }
    }

    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// True only for the most recently issued ticket.
    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.issued.load(Ordering::Relaxed)
    }
}
