//! Domain events
//!
//! Event types that represent facts about what happened in the system.
//! The EventBus implementation lives in `application::events`.

pub mod types;

pub use types::{
    Event, EventMessage, ReservationCreatedEvent, ReservationStatusChangedEvent, TripEvent,
    VehicleStatusChangedEvent,
};
