use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{drivers, rides, users};
use crate::middleware::rate_limit::{create_public_governor, log_request};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Both apps poll through the same surface; one IP-based limiter covers it
    let public_governor = create_public_governor();

    Router::new()
        // Ride lifecycle
        .route("/ride", post(rides::create_ride))
        .route("/ride/status", patch(rides::update_status))
        .route("/ride/verify", post(rides::verify_pickup))
        .route("/ride/{rider_id}", get(rides::rider_history))
        // Driver roster and ranking
        .route("/driver", get(drivers::list_drivers))
        .route("/driver/ranked", get(drivers::ranked_drivers))
        // User registry (principal ids come from the external auth provider)
        .route("/user", post(users::create_user))
        .route("/user/role", get(users::get_role).patch(users::update_role))
        .layer(middleware::from_fn(log_request))
        .layer(public_governor)
        .with_state(state)
}
