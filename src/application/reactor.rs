//! Booking event reactor
//!
//! Background task that turns lifecycle events into the cascades between
//! reservations, trips and vehicles. Failures are logged and the loop
//! keeps running. When the bus drops events the reactor re-derives the
//! missed cascades from storage.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::events::{
    Delivery, Event, EventMessage, ReservationStatusChangedEvent, SharedEventBus, TripEvent,
};
use crate::application::services::{ReservationService, TripService, VehicleService};
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::{Reservation, ReservationStatus};
use crate::domain::trip::TripStatus;
use crate::domain::vehicle::VehicleStatus;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::ShutdownSignal;

#[derive(Clone)]
pub struct BookingEventReactor {
    repos: Arc<dyn RepositoryProvider>,
    reservations: Arc<ReservationService>,
    trips: Arc<TripService>,
    vehicles: Arc<VehicleService>,
}

impl BookingEventReactor {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        reservations: Arc<ReservationService>,
        trips: Arc<TripService>,
        vehicles: Arc<VehicleService>,
    ) -> Self {
        Self {
            repos,
            reservations,
            trips,
            vehicles,
        }
    }

    /// Subscribe to `bus` and process events until shutdown or the bus closes.
    pub fn start(&self, bus: SharedEventBus, shutdown: ShutdownSignal) -> tokio::task::JoinHandle<()> {
        let reactor = self.clone();
        let mut subscriber = bus.subscribe();

        tokio::spawn(async move {
            info!("Booking event reactor started");
            loop {
                tokio::select! {
                    delivery = subscriber.next_delivery() => {
                        match delivery {
                            Some(Delivery::Message(message)) => reactor.dispatch(message).await,
                            Some(Delivery::Lagged(missed)) => {
                                warn!(
                                    missed,
                                    "Reactor fell behind the event bus; reservations and vehicles \
                                     may be stale until reconciled"
                                );
                                match reactor.reconcile().await {
                                    Ok(repaired) => info!(repaired, "Reconciled state after dropped events"),
                                    Err(e) => warn!(error = %e, "Reconciliation failed"),
                                }
                            }
                            None => break,
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("Booking event reactor shutting down");
                        break;
                    }
                }
            }
            info!("Booking event reactor stopped");
        })
    }

    async fn dispatch(&self, message: EventMessage) {
        let event_type = message.event.event_type();
        if let Err(e) = self.handle(&message.event).await {
            warn!(event_id = %message.id, event_type, error = %e, "Event handler failed");
        }
    }

    /// Apply the cascade for one event
    pub async fn handle(&self, event: &Event) -> DomainResult<()> {
        match event {
            Event::ReservationStatusChanged(e) => self.on_reservation_status(e).await,
            Event::TripStarted(e) => self.on_trip_started(e).await,
            Event::TripCompleted(e) => self.on_trip_completed(e).await,
            Event::ReservationCreated(_) | Event::TripOpened(_) | Event::VehicleStatusChanged(_) => {
                debug!(event_type = event.event_type(), "No cascade");
                Ok(())
            }
        }
    }

    /// Re-derive every cascade from stored state and apply the missing ones.
    /// Returns how many repairs were made.
    pub async fn reconcile(&self) -> DomainResult<usize> {
        let mut repaired = 0;

        // Trips drive their reservations forward
        for trip in self.repos.trips().list().await? {
            let Some(mut reservation) = self.repos.reservations().find_by_id(&trip.booking_id).await?
            else {
                continue;
            };
            if matches!(trip.status, TripStatus::Active | TripStatus::Completed)
                && reservation.status == ReservationStatus::Confirmed
            {
                match self.reservations.move_to(&reservation.id, ReservationStatus::Active).await {
                    Ok(moved) => {
                        reservation = moved;
                        repaired += 1;
                    }
                    Err(e) => warn!(booking_id = %reservation.id, error = %e, "Could not activate reservation"),
                }
            }
            if trip.status == TripStatus::Completed && reservation.status == ReservationStatus::Active {
                match self.reservations.move_to(&reservation.id, ReservationStatus::Completed).await {
                    Ok(_) => repaired += 1,
                    Err(e) => warn!(booking_id = %reservation.id, error = %e, "Could not complete reservation"),
                }
            }
        }

        // Reservations drive trips and vehicles
        let reservations = self.repos.reservations().list().await?;
        for reservation in &reservations {
            match self.repair_reservation(reservation, &reservations).await {
                Ok(true) => repaired += 1,
                Ok(false) => {}
                Err(e) => warn!(booking_id = %reservation.id, error = %e, "Reconciliation step failed"),
            }
        }

        Ok(repaired)
    }

    async fn repair_reservation(
        &self,
        reservation: &Reservation,
        all: &[Reservation],
    ) -> DomainResult<bool> {
        let vehicle_id = &reservation.vehicle_id;
        match reservation.status {
            ReservationStatus::Confirmed => match self.trips.open_for(&reservation.id).await {
                Ok(_) => Ok(true),
                Err(DomainError::DuplicateTrip(_)) => Ok(false),
                Err(e) => Err(e),
            },
            ReservationStatus::Active => {
                if self.vehicle_status(vehicle_id).await? == Some(VehicleStatus::Rented) {
                    return Ok(false);
                }
                self.vehicles.mark_rented(vehicle_id).await.map(|_| true)
            }
            ReservationStatus::Completed => {
                let still_rented = all.iter().any(|other| {
                    &other.vehicle_id == vehicle_id && other.status == ReservationStatus::Active
                });
                if still_rented {
                    return Ok(false);
                }
                self.vehicles
                    .mark_available(vehicle_id)
                    .await
                    .map(|v| v.is_some())
            }
            ReservationStatus::Pending | ReservationStatus::Cancelled => Ok(false),
        }
    }

    async fn vehicle_status(&self, vehicle_id: &str) -> DomainResult<Option<VehicleStatus>> {
        Ok(self
            .repos
            .vehicles()
            .find_by_id(vehicle_id)
            .await?
            .map(|v| v.status))
    }

    async fn on_reservation_status(&self, e: &ReservationStatusChangedEvent) -> DomainResult<()> {
        use ReservationStatus::*;
        match (e.from, e.to) {
            (_, Confirmed) => match self.trips.open_for(&e.reservation_id).await {
                Ok(trip) => {
                    debug!(trip_id = %trip.id, booking_id = %e.reservation_id, "Trip opened on confirmation");
                    Ok(())
                }
                Err(DomainError::DuplicateTrip(_)) => Ok(()),
                Err(err) => Err(err),
            },
            (_, Active) => self.vehicles.mark_rented(&e.vehicle_id).await.map(|_| ()),
            (Active, Completed) => {
                self.vehicles.mark_available(&e.vehicle_id).await.map(|_| ())
            }
            (_, Cancelled) => {
                if let Some(trip) = self.trips.find_by_booking(&e.reservation_id).await? {
                    if trip.status.is_open() {
                        warn!(
                            booking_id = %e.reservation_id,
                            trip_id = %trip.id,
                            trip_status = %trip.status,
                            "Reservation cancelled while its trip is still open"
                        );
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn on_trip_started(&self, e: &TripEvent) -> DomainResult<()> {
        let reservation = self
            .reservations
            .move_to(&e.booking_id, ReservationStatus::Active)
            .await;
        match reservation {
            Ok(_) => Ok(()),
            // Already moved on by a direct request
            Err(DomainError::InvalidTransition { .. }) => {
                debug!(booking_id = %e.booking_id, "Reservation not confirmed; left as is");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn on_trip_completed(&self, e: &TripEvent) -> DomainResult<()> {
        self.reservations
            .move_to(&e.booking_id, ReservationStatus::Completed)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{
        book, confirmed_booking, driver, drain, fixture, host, vehicle,
    };
    use crate::domain::principal::Principal;
    use crate::domain::repositories::{Repository, RepositoryProvider};
    use crate::domain::trip::{PickupReport, ReturnReport, TripStatus};
    use crate::domain::vehicle::VehicleStatus;

    #[tokio::test]
    async fn full_rental_cascade() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        fx.reservations
            .transition(&host(), &r.id, ReservationStatus::Confirmed)
            .await
            .unwrap();
        drain(&fx).await;

        let trip = fx.trips.find_by_booking(&r.id).await.unwrap().unwrap();
        assert_eq!(trip.status, TripStatus::Scheduled);

        fx.trips
            .start(
                &driver(),
                &trip.id,
                PickupReport {
                    mileage: Some(1000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        drain(&fx).await;

        let res = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(res.status, ReservationStatus::Active);
        let veh = fx.vehicles.get(&host(), &v.id).await.unwrap();
        assert_eq!(veh.status, VehicleStatus::Rented);

        fx.trips
            .complete(
                &driver(),
                &trip.id,
                ReturnReport {
                    mileage: Some(1120),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        drain(&fx).await;

        let res = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(res.status, ReservationStatus::Completed);
        let path: Vec<_> = res.status_history.iter().map(|c| c.to).collect();
        assert_eq!(
            path,
            vec![
                ReservationStatus::Confirmed,
                ReservationStatus::Active,
                ReservationStatus::Completed
            ]
        );
        let veh = fx.vehicles.get(&host(), &v.id).await.unwrap();
        assert_eq!(veh.status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn confirmation_with_existing_trip_is_a_no_op() {
        let fx = fixture();
        let r = confirmed_booking(&fx).await;
        fx.trips.open_for(&r.id).await.unwrap();

        let event = Event::ReservationStatusChanged(ReservationStatusChangedEvent {
            reservation_id: r.id.clone(),
            vehicle_id: r.vehicle_id.clone(),
            from: ReservationStatus::Pending,
            to: ReservationStatus::Confirmed,
            timestamp: chrono::Utc::now(),
        });
        fx.reactor.handle(&event).await.unwrap();
        assert_eq!(fx.repos.trips().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelling_with_scheduled_trip_only_warns() {
        let fx = fixture();
        let r = confirmed_booking(&fx).await;
        let trip = fx.trips.open_for(&r.id).await.unwrap();

        fx.reservations.cancel(&driver(), &r.id).await.unwrap();
        drain(&fx).await;

        let stored = fx.trips.get(&Principal::admin("root"), &trip.id).await.unwrap();
        assert_eq!(stored.status, TripStatus::Scheduled);
    }

    #[tokio::test]
    async fn reconcile_replays_cascades_for_dropped_events() {
        let fx = fixture();
        let r = confirmed_booking(&fx).await;

        assert_eq!(fx.reactor.reconcile().await.unwrap(), 1);
        let trip = fx.trips.find_by_booking(&r.id).await.unwrap().unwrap();

        fx.trips
            .start(&driver(), &trip.id, PickupReport::default())
            .await
            .unwrap();
        fx.reactor.reconcile().await.unwrap();

        let res = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(res.status, ReservationStatus::Active);
        let veh = fx.vehicles.get(&host(), &r.vehicle_id).await.unwrap();
        assert_eq!(veh.status, VehicleStatus::Rented);

        fx.trips
            .complete(&driver(), &trip.id, ReturnReport::default())
            .await
            .unwrap();
        fx.reactor.reconcile().await.unwrap();

        let res = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(res.status, ReservationStatus::Completed);
        let veh = fx.vehicles.get(&host(), &r.vehicle_id).await.unwrap();
        assert_eq!(veh.status, VehicleStatus::Available);

        assert_eq!(fx.reactor.reconcile().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reactor_task_stops_on_shutdown() {
        let fx = fixture();
        let shutdown = ShutdownSignal::new();
        let handle = fx.reactor.start(fx.events.clone(), shutdown.clone());
        shutdown.trigger();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn running_reactor_opens_trip_on_confirmation() {
        let fx = fixture();
        let shutdown = ShutdownSignal::new();
        let handle = fx.reactor.start(fx.events.clone(), shutdown.clone());

        let r = confirmed_booking(&fx).await;
        let mut opened = None;
        for _ in 0..50 {
            opened = fx.trips.find_by_booking(&r.id).await.unwrap();
            if opened.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(opened.is_some());

        shutdown.trigger();
        handle.await.unwrap();
    }
}
