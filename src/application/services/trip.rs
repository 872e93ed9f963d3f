//! Trip lifecycle
//!
//! One trip per reservation. Opening is serialized per booking id; pickup
//! and return publish events the reactor turns into reservation moves.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::keyed_locks::{KeyGuard, KeyedLocks};
use crate::application::events::{Event, SharedEventBus, TripEvent};
use crate::domain::principal::Principal;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::trip::{PickupReport, ReturnReport, Trip, TripStatus};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub driver_id: Option<String>,
    pub host_id: Option<String>,
    pub status: Option<TripStatus>,
}

impl TripFilter {
    fn matches(&self, t: &Trip) -> bool {
        self.driver_id.as_ref().map_or(true, |d| &t.driver_id == d)
            && self.host_id.as_ref().map_or(true, |h| &t.host_id == h)
            && self.status.map_or(true, |s| t.status == s)
    }
}

pub struct TripService {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
    booking_locks: KeyedLocks,
    enforce_mileage: bool,
}

impl TripService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        events: SharedEventBus,
        enforce_mileage: bool,
    ) -> Self {
        Self {
            repos,
            events,
            booking_locks: KeyedLocks::new(),
            enforce_mileage,
        }
    }

    /// Open the trip for a confirmed reservation (host or admin)
    pub async fn open(&self, principal: &Principal, reservation_id: &str) -> DomainResult<Trip> {
        principal.require_host_or_admin()?;
        let reservation = self
            .repos
            .reservations()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))?;
        principal.ensure_reservation_access(&reservation)?;
        self.open_for(reservation_id).await
    }

    pub(crate) async fn open_for(&self, reservation_id: &str) -> DomainResult<Trip> {
        let _guard = self.booking_locks.acquire(reservation_id).await;

        let reservation = self
            .repos
            .reservations()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))?;

        if !reservation.status.is_confirmed_or_later() {
            return Err(DomainError::InvalidTransition {
                entity: "Trip",
                from: format!("reservation {}", reservation.status),
                to: TripStatus::Scheduled.to_string(),
            });
        }

        if let Some(existing) = self.find_by_booking(reservation_id).await? {
            return Err(DomainError::DuplicateTrip(format!(
                "reservation {} already has trip {}",
                reservation_id, existing.id
            )));
        }

        let trip = self
            .repos
            .trips()
            .insert(Trip::for_reservation(&reservation))
            .await?;

        info!(trip_id = %trip.id, booking_id = %trip.booking_id, "Trip opened");
        self.publish(&trip, Event::TripOpened);
        Ok(trip)
    }

    pub(crate) async fn find_by_booking(&self, booking_id: &str) -> DomainResult<Option<Trip>> {
        Ok(self
            .repos
            .trips()
            .list()
            .await?
            .into_iter()
            .find(|t| t.booking_id == booking_id))
    }

    async fn load(&self, id: &str) -> DomainResult<Trip> {
        self.repos
            .trips()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Trip", id))
    }

    /// Load a trip the caller may act on and lock its booking
    async fn load_for_update(
        &self,
        principal: &Principal,
        id: &str,
    ) -> DomainResult<(Trip, KeyGuard)> {
        let trip = self.load(id).await?;
        principal.ensure_trip_access(&trip)?;
        let guard = self.booking_locks.acquire(&trip.booking_id).await;
        Ok((self.load(id).await?, guard))
    }

    fn publish(&self, trip: &Trip, wrap: fn(TripEvent) -> Event) {
        self.events.publish(wrap(TripEvent {
            trip_id: trip.id.clone(),
            booking_id: trip.booking_id.clone(),
            vehicle_id: trip.vehicle_id.clone(),
            timestamp: Utc::now(),
        }));
    }

    pub async fn start(
        &self,
        principal: &Principal,
        id: &str,
        report: PickupReport,
    ) -> DomainResult<Trip> {
        let (mut trip, _guard) = self.load_for_update(principal, id).await?;
        trip.start(report, Utc::now())?;
        let trip = self.repos.trips().save(trip).await?;

        info!(trip_id = %trip.id, mileage_start = ?trip.mileage_start, "Trip started");
        self.publish(&trip, Event::TripStarted);
        Ok(trip)
    }

    pub async fn complete(
        &self,
        principal: &Principal,
        id: &str,
        report: ReturnReport,
    ) -> DomainResult<Trip> {
        let (mut trip, _guard) = self.load_for_update(principal, id).await?;
        trip.complete(report, self.enforce_mileage, Utc::now())?;
        let trip = self.repos.trips().save(trip).await?;

        metrics::counter!("trips_completed_total").increment(1);
        info!(
            trip_id = %trip.id,
            distance = ?trip.distance(),
            issues = trip.issues.len(),
            "Trip completed"
        );
        self.publish(&trip, Event::TripCompleted);
        Ok(trip)
    }

    pub async fn cancel(&self, principal: &Principal, id: &str) -> DomainResult<Trip> {
        let (mut trip, _guard) = self.load_for_update(principal, id).await?;
        trip.cancel()?;
        let trip = self.repos.trips().save(trip).await?;
        info!(trip_id = %trip.id, "Trip cancelled");
        Ok(trip)
    }

    pub async fn report_issue(
        &self,
        principal: &Principal,
        id: &str,
        description: String,
    ) -> DomainResult<Trip> {
        let (mut trip, _guard) = self.load_for_update(principal, id).await?;
        trip.report_issue(description, Utc::now())?;
        let trip = self.repos.trips().save(trip).await?;
        info!(trip_id = %trip.id, issues = trip.issues.len(), "Trip issue reported");
        Ok(trip)
    }

    pub async fn get(&self, principal: &Principal, id: &str) -> DomainResult<Trip> {
        let trip = self.load(id).await?;
        principal.ensure_trip_access(&trip)?;
        Ok(trip)
    }

    /// Trips matching `filter` that the caller may see
    pub async fn list(&self, principal: &Principal, filter: TripFilter) -> DomainResult<Vec<Trip>> {
        Ok(self
            .repos
            .trips()
            .list()
            .await?
            .into_iter()
            .filter(|t| filter.matches(t) && principal.can_access_trip(t))
            .collect())
    }

    pub async fn get_active(&self, principal: &Principal) -> DomainResult<Vec<Trip>> {
        self.list(
            principal,
            TripFilter {
                status: Some(TripStatus::Active),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn get_by_driver(&self, principal: &Principal, driver_id: &str) -> DomainResult<Vec<Trip>> {
        self.list(
            principal,
            TripFilter {
                driver_id: Some(driver_id.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn get_by_host(&self, principal: &Principal, host_id: &str) -> DomainResult<Vec<Trip>> {
        self.list(
            principal,
            TripFilter {
                host_id: Some(host_id.to_string()),
                ..Default::default()
            },
        )
        .await
    }
}
