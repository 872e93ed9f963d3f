//! Booking events
//!
//! Facts published by the lifecycles. Cascades between reservations, trips
//! and vehicles are driven by these rather than by inline writes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::reservation::ReservationStatus;
use crate::domain::vehicle::VehicleStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    ReservationCreated(ReservationCreatedEvent),
    ReservationStatusChanged(ReservationStatusChangedEvent),
    TripOpened(TripEvent),
    TripStarted(TripEvent),
    TripCompleted(TripEvent),
    VehicleStatusChanged(VehicleStatusChangedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ReservationCreated(_) => "reservation_created",
            Event::ReservationStatusChanged(_) => "reservation_status_changed",
            Event::TripOpened(_) => "trip_opened",
            Event::TripStarted(_) => "trip_started",
            Event::TripCompleted(_) => "trip_completed",
            Event::VehicleStatusChanged(_) => "vehicle_status_changed",
        }
    }

    pub fn vehicle_id(&self) -> &str {
        match self {
            Event::ReservationCreated(e) => &e.vehicle_id,
            Event::ReservationStatusChanged(e) => &e.vehicle_id,
            Event::TripOpened(e) | Event::TripStarted(e) | Event::TripCompleted(e) => {
                &e.vehicle_id
            }
            Event::VehicleStatusChanged(e) => &e.vehicle_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreatedEvent {
    pub reservation_id: String,
    pub vehicle_id: String,
    pub driver_id: String,
    pub host_id: String,
    pub total_amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusChangedEvent {
    pub reservation_id: String,
    pub vehicle_id: String,
    pub from: ReservationStatus,
    pub to: ReservationStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEvent {
    pub trip_id: String,
    pub booking_id: String,
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleStatusChangedEvent {
    pub vehicle_id: String,
    pub old_status: VehicleStatus,
    pub new_status: VehicleStatus,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_tagged_by_type() {
        let msg = EventMessage::new(Event::ReservationStatusChanged(
            ReservationStatusChangedEvent {
                reservation_id: "res_1".into(),
                vehicle_id: "veh_1".into(),
                from: ReservationStatus::Pending,
                to: ReservationStatus::Confirmed,
                timestamp: Utc::now(),
            },
        ));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ReservationStatusChanged");
        assert_eq!(json["data"]["to"], "confirmed");
        assert_eq!(msg.event.event_type(), "reservation_status_changed");
        assert_eq!(msg.event.vehicle_id(), "veh_1");
    }
}
