use serde::Serialize;
use uuid::Uuid;

use crate::entities::ride::RideStatus;
use crate::error::{AppError, AppResult};
use crate::repository::RideRepository;

/// Statuses a client may PATCH a ride to. `requested` is deliberately
/// absent: rides are created with a driver bound and never move backwards
/// into an unassigned state.
pub const TRANSITION_TARGETS: [RideStatus; 4] = [
    RideStatus::DriverEnRoute,
    RideStatus::Arrived,
    RideStatus::InProgress,
    RideStatus::Completed,
];

/// Parse a wire-format status string.
pub fn parse_status(raw: &str) -> Option<RideStatus> {
    match raw {
        "requested" => Some(RideStatus::Requested),
        "driver_en_route" => Some(RideStatus::DriverEnRoute),
        "arrived" => Some(RideStatus::Arrived),
        "in_progress" => Some(RideStatus::InProgress),
        "completed" => Some(RideStatus::Completed),
        _ => None,
    }
}

/// Position of a status along the forward lifecycle. Used by client sessions
/// to recognize stale snapshots; the server-side transition path does not
/// consult it (see DESIGN.md on the permissive update path).
pub fn sequence_index(status: RideStatus) -> u8 {
    match status {
        RideStatus::Requested => 0,
        RideStatus::DriverEnRoute => 1,
        RideStatus::Arrived => 2,
        RideStatus::InProgress => 3,
        RideStatus::Completed => 4,
    }
}

/// The only observable result of a successful transition besides the
/// persisted row change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub ride_id: Uuid,
    pub status: RideStatus,
}

/// Authoritative ride lifecycle. Owns transition validation and the
/// pickup-code gate; all storage goes through the repository contract.
pub struct RideStateMachine<R> {
    repo: R,
}

impl<R: RideRepository> RideStateMachine<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Apply a status transition. Targets outside the accepted set are
    /// rejected before any storage access. The current state is not checked
    /// server-side: rider and driver apps each own disjoint transitions by
    /// convention, and a repeated PATCH of the same status is a harmless
    /// no-op.
    pub async fn apply_status(
        &self,
        ride_id: Uuid,
        status: RideStatus,
    ) -> AppResult<StatusChange> {
        if !TRANSITION_TARGETS.contains(&status) {
            return Err(AppError::Validation(
                "status must be one of driver_en_route, arrived, in_progress, completed"
                    .to_string(),
            ));
        }

        self.repo
            .update_status(ride_id, status)
            .await?
            .map(|(ride_id, status)| StatusChange { ride_id, status })
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))
    }

    /// Gate the `arrived -> in_progress` transition on the pickup code.
    /// Two-step: a missing ride is NotFound, a mismatched code is Conflict,
    /// and both leave the stored status untouched.
    pub async fn verify_pickup(&self, ride_id: Uuid, code: &str) -> AppResult<StatusChange> {
        let stored = self
            .repo
            .verification_code(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

        if stored != code {
            return Err(AppError::Conflict("Invalid code".to_string()));
        }

        self.repo
            .update_status(ride_id, RideStatus::InProgress)
            .await?
            .map(|(ride_id, status)| StatusChange { ride_id, status })
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::entities::{driver, ride};
    use crate::repository::{generate_verification_code, RideDraft, RideRepository};

    /// Row-store stand-in mirroring the sea-orm repository's semantics.
    #[derive(Default)]
    struct InMemoryRepo {
        rides: Mutex<HashMap<Uuid, ride::Model>>,
        update_calls: AtomicUsize,
    }

    impl RideRepository for InMemoryRepo {
        async fn create(&self, draft: RideDraft) -> AppResult<ride::Model> {
            let ride = ride::Model {
                ride_id: Uuid::new_v4(),
                origin_address: draft.origin_address,
                destination_address: draft.destination_address,
                origin_latitude: draft.origin_latitude,
                origin_longitude: draft.origin_longitude,
                destination_latitude: draft.destination_latitude,
                destination_longitude: draft.destination_longitude,
                ride_time: draft.ride_time,
                fare_price: draft.fare_price,
                payment_status: draft.payment_status,
                driver_id: draft.driver_id,
                user_id: draft.user_id,
                status: ride::RideStatus::DriverEnRoute,
                verification_code: generate_verification_code(),
                created_at: Utc::now().into(),
            };

            self.rides
                .lock()
                .unwrap()
                .insert(ride.ride_id, ride.clone());
            Ok(ride)
        }

        async fn get_by_id(&self, ride_id: Uuid) -> AppResult<Option<ride::Model>> {
            Ok(self.rides.lock().unwrap().get(&ride_id).cloned())
        }

        async fn list_by_rider(
            &self,
            rider_id: &str,
        ) -> AppResult<Vec<(ride::Model, Option<driver::Model>)>> {
            let mut rides: Vec<ride::Model> = self
                .rides
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.user_id == rider_id)
                .cloned()
                .collect();
            rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rides.into_iter().map(|r| (r, None)).collect())
        }

        async fn update_status(
            &self,
            ride_id: Uuid,
            status: RideStatus,
        ) -> AppResult<Option<(Uuid, RideStatus)>> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let mut rides = self.rides.lock().unwrap();
            match rides.get_mut(&ride_id) {
                Some(ride) => {
                    ride.status = status;
                    Ok(Some((ride_id, status)))
                }
                None => Ok(None),
            }
        }

        async fn verification_code(&self, ride_id: Uuid) -> AppResult<Option<String>> {
            Ok(self
                .rides
                .lock()
                .unwrap()
                .get(&ride_id)
                .map(|r| r.verification_code.clone()))
        }
    }

    fn sample_draft() -> RideDraft {
        RideDraft {
            origin_address: "Av. Reforma 1".to_string(),
            destination_address: "Av. Insurgentes 500".to_string(),
            origin_latitude: 10.0,
            origin_longitude: 10.0,
            destination_latitude: 10.0,
            destination_longitude: 20.0,
            ride_time: 25,
            fare_price: 120.0,
            payment_status: "pending".to_string(),
            driver_id: 5,
            user_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_read_round_trip() {
        let repo = InMemoryRepo::default();
        let draft = sample_draft();

        let created = repo.create(draft.clone()).await.unwrap();
        let fetched = repo.get_by_id(created.ride_id).await.unwrap().unwrap();

        assert_eq!(fetched.origin_address, draft.origin_address);
        assert_eq!(fetched.destination_address, draft.destination_address);
        assert_eq!(fetched.user_id, draft.user_id);
        assert_eq!(fetched.driver_id, draft.driver_id);
        assert_eq!(fetched.status, RideStatus::DriverEnRoute);
        assert!(!fetched.verification_code.is_empty());
        assert!((4..=6).contains(&fetched.verification_code.len()));
    }

    #[tokio::test]
    async fn requested_is_not_a_valid_transition_target() {
        let repo = InMemoryRepo::default();
        let ride = repo.create(sample_draft()).await.unwrap();

        let machine = RideStateMachine::new(&repo);
        let result = machine
            .apply_status(ride.ride_id, RideStatus::Requested)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        // Rejected before touching storage
        assert_eq!(repo.update_calls.load(Ordering::SeqCst), 0);
        let stored = repo.get_by_id(ride.ride_id).await.unwrap().unwrap();
        assert_eq!(stored.status, RideStatus::DriverEnRoute);
    }

    #[tokio::test]
    async fn apply_status_on_unknown_ride_is_not_found() {
        let repo = InMemoryRepo::default();
        let machine = RideStateMachine::new(&repo);

        let result = machine
            .apply_status(Uuid::new_v4(), RideStatus::Arrived)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn repeated_status_is_an_idempotent_no_op() {
        let repo = InMemoryRepo::default();
        let ride = repo.create(sample_draft()).await.unwrap();
        let machine = RideStateMachine::new(&repo);

        let first = machine
            .apply_status(ride.ride_id, RideStatus::Arrived)
            .await
            .unwrap();
        let second = machine
            .apply_status(ride.ride_id, RideStatus::Arrived)
            .await
            .unwrap();

        assert_eq!(first, second);
        let stored = repo.get_by_id(ride.ride_id).await.unwrap().unwrap();
        assert_eq!(stored.status, RideStatus::Arrived);
    }

    #[tokio::test]
    async fn verify_on_unknown_ride_is_not_found_never_conflict() {
        let repo = InMemoryRepo::default();
        let machine = RideStateMachine::new(&repo);

        let result = machine.verify_pickup(Uuid::new_v4(), "1234").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn verify_with_wrong_code_is_conflict_and_leaves_status() {
        let repo = InMemoryRepo::default();
        let ride = repo.create(sample_draft()).await.unwrap();
        let machine = RideStateMachine::new(&repo);

        machine
            .apply_status(ride.ride_id, RideStatus::Arrived)
            .await
            .unwrap();

        let wrong = if ride.verification_code == "0000" {
            "9999"
        } else {
            "0000"
        };
        let result = machine.verify_pickup(ride.ride_id, wrong).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let stored = repo.get_by_id(ride.ride_id).await.unwrap().unwrap();
        assert_eq!(stored.status, RideStatus::Arrived);
    }

    #[tokio::test]
    async fn verify_with_right_code_moves_to_in_progress() {
        let repo = InMemoryRepo::default();
        let ride = repo.create(sample_draft()).await.unwrap();
        let machine = RideStateMachine::new(&repo);

        machine
            .apply_status(ride.ride_id, RideStatus::Arrived)
            .await
            .unwrap();

        let change = machine
            .verify_pickup(ride.ride_id, &ride.verification_code)
            .await
            .unwrap();

        assert_eq!(change.ride_id, ride.ride_id);
        assert_eq!(change.status, RideStatus::InProgress);
        let stored = repo.get_by_id(ride.ride_id).await.unwrap().unwrap();
        assert_eq!(stored.status, RideStatus::InProgress);
    }

    #[tokio::test]
    async fn verify_succeeds_regardless_of_prior_status() {
        let repo = InMemoryRepo::default();
        let ride = repo.create(sample_draft()).await.unwrap();
        let machine = RideStateMachine::new(&repo);

        // Still driver_en_route; the gate only checks the code
        let change = machine
            .verify_pickup(ride.ride_id, &ride.verification_code)
            .await
            .unwrap();

        assert_eq!(change.status, RideStatus::InProgress);
    }

    #[tokio::test]
    async fn full_pickup_scenario() {
        let repo = InMemoryRepo::default();
        let machine = RideStateMachine::new(&repo);

        let ride = repo.create(sample_draft()).await.unwrap();
        assert!((4..=6).contains(&ride.verification_code.len()));

        machine
            .apply_status(ride.ride_id, RideStatus::Arrived)
            .await
            .unwrap();

        let wrong = if ride.verification_code == "1111" {
            "2222"
        } else {
            "1111"
        };
        assert!(matches!(
            machine.verify_pickup(ride.ride_id, wrong).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(
            repo.get_by_id(ride.ride_id).await.unwrap().unwrap().status,
            RideStatus::Arrived
        );

        let change = machine
            .verify_pickup(ride.ride_id, &ride.verification_code)
            .await
            .unwrap();
        assert_eq!(change.status, RideStatus::InProgress);
    }

    #[tokio::test]
    async fn list_by_rider_is_newest_first_and_empty_for_unknown() {
        let repo = InMemoryRepo::default();
        let first = repo.create(sample_draft()).await.unwrap();

        let mut later = sample_draft();
        later.destination_address = "Aeropuerto T2".to_string();
        // Force a later timestamp regardless of clock resolution
        let second = {
            let created = repo.create(later).await.unwrap();
            let mut rides = repo.rides.lock().unwrap();
            let entry = rides.get_mut(&created.ride_id).unwrap();
            entry.created_at = (Utc::now() + chrono::Duration::seconds(1)).into();
            entry.clone()
        };

        let listed = repo.list_by_rider("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0.ride_id, second.ride_id);
        assert_eq!(listed[1].0.ride_id, first.ride_id);

        assert!(repo.list_by_rider("nobody").await.unwrap().is_empty());
    }

    #[test]
    fn parse_status_rejects_unknown_values() {
        assert_eq!(parse_status("arrived"), Some(RideStatus::Arrived));
        assert_eq!(parse_status("in_progress"), Some(RideStatus::InProgress));
        assert_eq!(parse_status("cancelled"), None);
        assert_eq!(parse_status(""), None);
        assert_eq!(parse_status("ARRIVED"), None);
    }

    #[test]
    fn sequence_index_orders_the_lifecycle() {
        assert!(sequence_index(RideStatus::Requested) < sequence_index(RideStatus::DriverEnRoute));
        assert!(sequence_index(RideStatus::DriverEnRoute) < sequence_index(RideStatus::Arrived));
        assert!(sequence_index(RideStatus::Arrived) < sequence_index(RideStatus::InProgress));
        assert!(sequence_index(RideStatus::InProgress) < sequence_index(RideStatus::Completed));
    }
}
