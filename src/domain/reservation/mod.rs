//! Reservation aggregate
//!
//! Contains the Reservation entity, its status machines and the booking
//! period overlap rule.

pub mod model;
pub mod period;

pub use model::{ContactInfo, PaymentStatus, Reservation, ReservationStatus, StatusChange};
pub use period::{parse_date, BookingPeriod};
