//! Application layer
//!
//! Services that run the booking use cases against the repository
//! contracts, the event bus, and the reactor that applies cascades.

pub mod wiring;
pub mod events;
pub mod reactor;
pub mod services;

#[cfg(test)]
mod scenarios;

pub use wiring::{BookingCore, BookingOptions};
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use reactor::BookingEventReactor;
pub use services::{
    AvailabilityService, ProfileService, ReservationService, RevenueService, TripService,
    VehicleService,
};
