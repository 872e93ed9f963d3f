//! Service wiring shared by the server and the tests

use std::sync::Arc;

use crate::application::events::{create_event_bus, SharedEventBus};
use crate::application::reactor::BookingEventReactor;
use crate::application::services::{
    AvailabilityService, ProfileService, ReservationService, RevenueService, TripService,
    VehicleService,
};
use crate::domain::repositories::RepositoryProvider;

/// Runtime policy knobs for the booking services
#[derive(Debug, Clone)]
pub struct BookingOptions {
    pub enforce_mileage_check: bool,
    pub event_bus_capacity: usize,
}

impl Default for BookingOptions {
    fn default() -> Self {
        Self {
            enforce_mileage_check: true,
            event_bus_capacity: crate::application::events::DEFAULT_CAPACITY,
        }
    }
}

/// Every booking service over one repository provider and one event bus
#[derive(Clone)]
pub struct BookingCore {
    pub repos: Arc<dyn RepositoryProvider>,
    pub events: SharedEventBus,
    pub availability: AvailabilityService,
    pub reservations: Arc<ReservationService>,
    pub trips: Arc<TripService>,
    pub vehicles: Arc<VehicleService>,
    pub revenue: Arc<RevenueService>,
    pub profiles: Arc<ProfileService>,
    pub reactor: BookingEventReactor,
}

impl BookingCore {
    pub fn new(repos: Arc<dyn RepositoryProvider>, options: &BookingOptions) -> Self {
        let events = create_event_bus(options.event_bus_capacity);

        let reservations = Arc::new(ReservationService::new(repos.clone(), events.clone()));
        let trips = Arc::new(TripService::new(
            repos.clone(),
            events.clone(),
            options.enforce_mileage_check,
        ));
        let vehicles = Arc::new(VehicleService::new(repos.clone(), events.clone()));
        let reactor = BookingEventReactor::new(
            repos.clone(),
            reservations.clone(),
            trips.clone(),
            vehicles.clone(),
        );

        Self {
            availability: AvailabilityService::new(repos.clone()),
            revenue: Arc::new(RevenueService::new(repos.clone())),
            profiles: Arc::new(ProfileService::new(repos.clone())),
            repos,
            events,
            reservations,
            trips,
            vehicles,
            reactor,
        }
    }
}
