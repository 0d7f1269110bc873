//! Client-side ride session state.
//!
//! The rider and driver apps each mirror one active ride plus the map state
//! around it. Instead of mutable global stores, the session is a value
//! reduced by explicit events, so behavior is testable without a UI harness.
//! The server row stays the source of truth: ride snapshots enter the state
//! only through `RideRefreshed` events carrying server payloads.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::entities::ride;
use crate::entities::user::UserRole;
use crate::lifecycle::sequence_index;
use crate::ranking::RankedDriver;
use crate::utils::geo::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub struct NamedLocation {
    pub coordinate: Coordinate,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub role: UserRole,
    pub user_location: Option<NamedLocation>,
    pub destination: Option<NamedLocation>,
    pub drivers: Vec<RankedDriver>,
    pub selected_driver: Option<i32>,
    /// Last-known copy of the active ride. A cache, not the source of
    /// truth; stale until reconciled by a fresh read after any mutation.
    pub active_ride: Option<ride::Model>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            role: UserRole::Client,
            user_location: None,
            destination: None,
            drivers: Vec::new(),
            selected_driver: None,
            active_ride: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    UserLocationChanged(NamedLocation),
    DestinationChanged(NamedLocation),
    DriversRanked(Vec<RankedDriver>),
    DriverSelected(i32),
    DriverCleared,
    /// A ride snapshot returned by the server (mutation response or poll).
    RideRefreshed(ride::Model),
    RideClosed,
    RoleChanged(UserRole),
}

/// Pure reducer over the session. Moving the map (either endpoint) clears
/// the driver selection since the ranking it was based on is now invalid. A
/// refresh that would move the same ride's status backwards is an
/// out-of-order poll response and is ignored.
pub fn reduce(mut state: SessionState, event: SessionEvent) -> SessionState {
    match event {
        SessionEvent::UserLocationChanged(location) => {
            state.user_location = Some(location);
            state.selected_driver = None;
        }
        SessionEvent::DestinationChanged(location) => {
            state.destination = Some(location);
            state.selected_driver = None;
        }
        SessionEvent::DriversRanked(drivers) => {
            state.drivers = drivers;
        }
        SessionEvent::DriverSelected(driver_id) => {
            state.selected_driver = Some(driver_id);
        }
        SessionEvent::DriverCleared => {
            state.selected_driver = None;
        }
        SessionEvent::RideRefreshed(incoming) => {
            let stale = state.active_ride.as_ref().is_some_and(|current| {
                current.ride_id == incoming.ride_id
                    && sequence_index(incoming.status) < sequence_index(current.status)
            });
            if !stale {
                state.active_ride = Some(incoming);
            }
        }
        SessionEvent::RideClosed => {
            state.active_ride = None;
        }
        SessionEvent::RoleChanged(role) => {
            state.role = role;
        }
    }
    state
}

/// Handle to a running re-fetch task. Dropping it tears the task down, so a
/// view going away cancels its polling.
pub struct RidePoll {
    pub events: mpsc::Receiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl RidePoll {
    /// Cancel the re-fetch task. Equivalent to dropping the handle.
    pub fn stop(self) {}
}

impl Drop for RidePoll {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Scheduled re-fetch of the active ride. There is no push channel; the
/// session reconciles by polling. `fetch` returning `None` (no ride yet, or
/// a failed request) skips that tick.
pub fn spawn_ride_poll<F, Fut>(period: Duration, mut fetch: F) -> RidePoll
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Option<ride::Model>> + Send,
{
    let (tx, rx) = mpsc::channel(8);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Some(ride) = fetch().await {
                if tx.send(SessionEvent::RideRefreshed(ride)).await.is_err() {
                    break;
                }
            }
        }
    });

    RidePoll { events: rx, task }
}
