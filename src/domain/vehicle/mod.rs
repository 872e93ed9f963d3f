//! Vehicle aggregate
//!
//! Read by the booking core; only status changes are driven from here.

pub mod model;

pub use model::{Vehicle, VehicleListing, VehicleStatus};
