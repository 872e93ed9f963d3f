//! Trip aggregate

pub mod model;

pub use model::{PickupReport, ReturnReport, Trip, TripIssue, TripStatus};
