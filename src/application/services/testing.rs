//! Shared fixture for service tests: in-memory repositories, a bus and
//! every service wired the way the server wires them.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::*;
use crate::application::wiring::{BookingCore, BookingOptions};
use crate::application::events::{EventSubscriber, SharedEventBus};
use crate::application::reactor::BookingEventReactor;
use crate::domain::principal::Principal;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::{ContactInfo, Reservation, ReservationStatus};
use crate::domain::vehicle::Vehicle;
use crate::infrastructure::storage::InMemoryRepositoryProvider;

pub const DRIVER_ID: &str = "drv_1";
pub const HOST_ID: &str = "hst_1";

pub struct Fixture {
    pub repos: Arc<dyn RepositoryProvider>,
    pub events: SharedEventBus,
    pub availability: AvailabilityService,
    pub reservations: Arc<ReservationService>,
    pub trips: Arc<TripService>,
    pub vehicles: Arc<VehicleService>,
    pub revenue: Arc<RevenueService>,
    pub profiles: Arc<ProfileService>,
    pub reactor: BookingEventReactor,
    inbox: Mutex<EventSubscriber>,
}

pub fn fixture() -> Fixture {
    let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
    let core = BookingCore::new(
        repos,
        &BookingOptions {
            enforce_mileage_check: true,
            event_bus_capacity: 256,
        },
    );
    let inbox = Mutex::new(core.events.subscribe());

    Fixture {
        repos: core.repos,
        events: core.events,
        availability: core.availability,
        reservations: core.reservations,
        trips: core.trips,
        vehicles: core.vehicles,
        revenue: core.revenue,
        profiles: core.profiles,
        reactor: core.reactor,
        inbox,
    }
}

pub fn driver() -> Principal {
    Principal::driver("usr_driver", DRIVER_ID)
}

pub fn host() -> Principal {
    Principal::host("usr_host", HOST_ID)
}

/// Run the reactor over every queued event, including the ones it causes.
pub async fn drain(fx: &Fixture) {
    let mut inbox = fx.inbox.lock().await;
    while let Some(message) = inbox.try_recv() {
        fx.reactor.handle(&message.event).await.unwrap();
    }
}

pub async fn vehicle(fx: &Fixture, host_id: &str, location: &str, rate: i64) -> Vehicle {
    fx.repos
        .vehicles()
        .insert(Vehicle::new(
            host_id,
            "Toyota",
            "Corolla",
            2022,
            "JT2BF22K1W0123456",
            Decimal::from(rate),
            location,
        ))
        .await
        .unwrap()
}

pub async fn book(fx: &Fixture, vehicle_id: &str, start: &str, end: &str) -> Reservation {
    fx.reservations
        .create(
            &driver(),
            NewReservation {
                vehicle_id: vehicle_id.to_string(),
                pickup_date: start.to_string(),
                return_date: end.to_string(),
                contact: ContactInfo {
                    driver_name: "Dana".into(),
                    driver_email: "dana@example.com".into(),
                    driver_phone: None,
                },
                notes: None,
            },
        )
        .await
        .unwrap()
}

/// A $50/day vehicle booked Jan 10 to Jan 12 and confirmed by its host
pub async fn confirmed_booking(fx: &Fixture) -> Reservation {
    let v = vehicle(fx, HOST_ID, "Austin", 50).await;
    let r = book(fx, &v.id, "2025-01-10", "2025-01-12").await;
    fx.reservations
        .move_to(&r.id, ReservationStatus::Confirmed)
        .await
        .unwrap()
}
